use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;

use urlencoding::encode;
use crate::client::BarberLinkClient;
use crate::error::{BarberLinkError, Result};
use crate::models::{ImageUpload, NewUser, Profile, ProfilePatch, RegistrationRequest, Role};
use crate::profile::{ClientRegistrar, ProfileFetcher};

#[derive(Serialize)]
struct Empty {}

impl BarberLinkClient {
    /// `GET /usuarios/firebase/{external_id}`
    pub async fn fetch_profile(&self, external_id: &str) -> Result<Profile> {
        if external_id.trim().is_empty() {
            return Err(BarberLinkError::validation("Identificador de usuário ausente."));
        }
        debug!("[PROFILE] Fetching profile for uid={}", external_id);
        self.get_json(&format!("usuarios/firebase/{}", encode(external_id)), &[])
            .await
    }

    async fn list_users_with_role(&self, role: Role) -> Result<Vec<Profile>> {
        self.get_json("usuarios", &[("role", role.as_str().to_string())])
            .await
    }

    /// Barbers, for the booking flow and the team screen.
    pub async fn list_professionals(&self) -> Result<Vec<Profile>> {
        self.list_users_with_role(Role::Staff).await
    }

    pub async fn list_clients(&self) -> Result<Vec<Profile>> {
        self.list_users_with_role(Role::Client).await
    }

    /// Pre-provision a barber or client from the admin panel.
    pub async fn create_user(&self, user: &NewUser) -> Result<Profile> {
        info!("[PROFILE] Creating {} account for {}", user.role, user.email);
        self.post_json("usuarios", user).await
    }

    /// `PUT /usuarios/{id}`; returns the updated profile.
    pub async fn update_user(&self, id: &str, patch: &ProfilePatch) -> Result<Profile> {
        if patch.is_empty() {
            return Err(BarberLinkError::validation("Nenhuma alteração para salvar."));
        }
        self.put_json(&format!("usuarios/{}", encode(id)), patch).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.delete(&format!("usuarios/{}", encode(id))).await
    }

    /// Reset a client's password to the backend default.
    pub async fn reset_client_password(&self, id: &str) -> Result<()> {
        self.post_unit(&format!("usuarios/{}/reset-senha", encode(id)), &Empty {})
            .await
    }

    /// Multipart upload of a new avatar; returns the updated profile.
    pub async fn upload_avatar(&self, id: &str, image: ImageUpload) -> Result<Profile> {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|e| BarberLinkError::validation(format!("Tipo de imagem inválido: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("image", part);
        self.send_multipart(
            reqwest::Method::POST,
            &format!("usuarios/{}/avatar", encode(id)),
            form,
        )
        .await
    }

    /// `POST /clientes`, the public sign-up endpoint.
    pub async fn register_client(&self, request: &RegistrationRequest) -> Result<()> {
        info!("[PROFILE] Registering client {}", request.email);
        self.post_unit("clientes", request).await
    }
}

#[async_trait]
impl ProfileFetcher for BarberLinkClient {
    async fn fetch_profile(&self, external_id: &str) -> Result<Profile> {
        BarberLinkClient::fetch_profile(self, external_id).await
    }
}

#[async_trait]
impl ClientRegistrar for BarberLinkClient {
    async fn register_client(&self, request: &RegistrationRequest) -> Result<()> {
        BarberLinkClient::register_client(self, request).await
    }
}
