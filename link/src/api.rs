//! Backend endpoints, grouped by resource.
//!
//! Each submodule adds methods to [`BarberLinkClient`](crate::BarberLinkClient).

mod appointments;
mod reports;
mod services;
mod users;
