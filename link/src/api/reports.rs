use crate::client::BarberLinkClient;
use crate::error::{BarberLinkError, Result};
use crate::models::MonthlyReport;

impl BarberLinkClient {
    /// `GET /relatorios/mensal?mes=..&ano=..`, admin only.
    pub async fn monthly_report(&self, month: u32, year: i32) -> Result<MonthlyReport> {
        if !(1..=12).contains(&month) {
            return Err(BarberLinkError::validation("Mês inválido."));
        }
        self.get_json(
            "relatorios/mensal",
            &[("mes", month.to_string()), ("ano", year.to_string())],
        )
        .await
    }
}
