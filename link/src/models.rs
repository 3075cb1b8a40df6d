//! Data models for barber-link.
//!
//! Field names follow the backend's Portuguese wire format through serde
//! renames; the Rust side uses English names.

pub mod appointment;
pub mod appointment_status;
pub(crate) mod envelope;
pub mod identity_user;
pub mod image_upload;
pub mod monthly_report;
pub mod new_appointment;
pub mod new_user;
pub mod profile;
pub mod profile_patch;
pub mod registration;
pub mod role;
pub mod service;
pub mod slot;
pub mod utils;


pub use appointment::{Appointment, BookedService, ServiceRef, UserRef, UserSummary};
pub use appointment_status::AppointmentStatus;
pub use identity_user::IdentityUser;
pub use image_upload::ImageUpload;
pub use monthly_report::{MonthlyReport, ServiceRanking};
pub use new_appointment::{NewAppointment, ServiceLine};
pub use new_user::{NewUser, DEFAULT_INITIAL_PASSWORD};
pub use profile::Profile;
pub use profile_patch::ProfilePatch;
pub use registration::{RegistrationForm, RegistrationRequest};
pub use role::Role;
pub use service::{Service, ServiceDraft};
pub use slot::{AvailabilityResponse, Slot};
