use serde::{Deserialize, Serialize};

/// Best-selling service entry of a monthly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRanking {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "quantidade", alias = "quantity")]
    pub quantity: u32,
}

/// `GET /relatorios/mensal` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    #[serde(rename = "mes", alias = "month")]
    pub month: u32,

    #[serde(rename = "ano", alias = "year")]
    pub year: i32,

    #[serde(rename = "totalAgendamentos", default)]
    pub total_appointments: u32,

    #[serde(rename = "faturamento", default)]
    pub revenue: f64,

    #[serde(rename = "servicosMaisVendidos", default)]
    pub top_services: Vec<ServiceRanking>,
}
