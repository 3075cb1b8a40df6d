use serde::{Deserialize, Serialize};

use super::image_upload::ImageUpload;
use super::utils::{default_true, f64_from_number_or_string, u32_from_number_or_string};

/// A bookable barbershop service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub name: String,

    #[serde(deserialize_with = "f64_from_number_or_string")]
    pub price: f64,

    #[serde(rename = "duracao", deserialize_with = "u32_from_number_or_string")]
    pub duration_minutes: u32,

    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Form data for creating or editing a service from the admin panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    /// New image to upload; `None` keeps the current one on update
    pub image: Option<ImageUpload>,
}

impl ServiceDraft {
    pub fn new(name: impl Into<String>, price: f64, duration_minutes: u32) -> Self {
        Self {
            name: name.into(),
            price,
            duration_minutes,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }
}
