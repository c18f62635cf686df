// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::client::Currency;

// Resumo exibido no topo do painel do admin
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_clients: usize,
    pub clients_by_plan: PlanBreakdown,
    pub monthly_revenue: Vec<CurrencyTotal>, // Uma linha por moeda, nunca somadas entre si
    pub total_reports: usize,
    pub unread_messages: usize,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanBreakdown {
    pub start: usize,
    pub pro: usize,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct CurrencyTotal {
    pub currency: Currency,
    #[schema(value_type = f64)]
    pub total: Decimal,
}
