use log::debug;

use urlencoding::encode;
use crate::client::BarberLinkClient;
use crate::error::{BarberLinkError, Result};
use crate::models::{Service, ServiceDraft};

fn draft_form(draft: ServiceDraft) -> Result<reqwest::multipart::Form> {
    if draft.name.trim().is_empty() {
        return Err(BarberLinkError::validation("Informe o nome do serviço."));
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(BarberLinkError::validation("Preço inválido."));
    }
    if draft.duration_minutes == 0 {
        return Err(BarberLinkError::validation("Duração inválida."));
    }

    let mut form = reqwest::multipart::Form::new()
        .text("name", draft.name.trim().to_string())
        .text("price", draft.price.to_string())
        .text("duracao", draft.duration_minutes.to_string());

    if let Some(image) = draft.image {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|e| BarberLinkError::validation(format!("Tipo de imagem inválido: {}", e)))?;
        form = form.part("image", part);
    }
    Ok(form)
}

impl BarberLinkClient {
    /// `GET /servicos`.
    ///
    /// Inactive services are dropped unless `include_inactive` is set (the
    /// admin catalogue shows them, the booking flow does not).
    pub async fn list_services(&self, include_inactive: bool) -> Result<Vec<Service>> {
        let services: Vec<Service> = self.get_json("servicos", &[]).await?;
        let total = services.len();
        let services: Vec<Service> = services
            .into_iter()
            .filter(|service| include_inactive || service.is_active)
            .collect();
        debug!("[SERVICES] Loaded {} services ({} shown)", total, services.len());
        Ok(services)
    }

    pub async fn create_service(&self, draft: ServiceDraft) -> Result<Service> {
        let form = draft_form(draft)?;
        self.send_multipart(reqwest::Method::POST, "servicos", form)
            .await
    }

    /// Replace a service; a draft without image keeps the current one.
    pub async fn update_service(&self, id: &str, draft: ServiceDraft) -> Result<Service> {
        let form = draft_form(draft)?;
        self.send_multipart(
            reqwest::Method::PUT,
            &format!("servicos/{}", encode(id)),
            form,
        )
        .await
    }

    pub async fn delete_service(&self, id: &str) -> Result<()> {
        self.delete(&format!("servicos/{}", encode(id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageUpload;

    #[test]
    fn test_draft_validation() {
        assert!(draft_form(ServiceDraft::new("Corte", 35.0, 30)).is_ok());
        assert!(draft_form(ServiceDraft::new("Corte", 35.0, 30)
            .with_image(ImageUpload::jpeg("corte.jpg", vec![0xFF, 0xD8])))
        .is_ok());

        for draft in [
            ServiceDraft::new(" ", 35.0, 30),
            ServiceDraft::new("Corte", -1.0, 30),
            ServiceDraft::new("Corte", f64::NAN, 30),
            ServiceDraft::new("Corte", 35.0, 0),
        ] {
            assert!(matches!(
                draft_form(draft),
                Err(BarberLinkError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_bad_mime_type_is_validation_error() {
        let draft = ServiceDraft::new("Corte", 35.0, 30)
            .with_image(ImageUpload::new("x", "not a mime", vec![1]));
        assert!(matches!(
            draft_form(draft),
            Err(BarberLinkError::ValidationError(_))
        ));
    }
}
