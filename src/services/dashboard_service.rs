// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        client::{Currency, Plan},
        dashboard::{AdminOverview, CurrencyTotal, PlanBreakdown},
    },
    services::{
        client_service::ClientService, inbox_service::InboxService, report_service::ReportService,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    clients: ClientService,
    reports: ReportService,
    inbox: InboxService,
}

impl DashboardService {
    pub fn new(clients: ClientService, reports: ReportService, inbox: InboxService) -> Self {
        Self { clients, reports, inbox }
    }

    pub async fn overview(&self) -> Result<AdminOverview, AppError> {
        let clients = self.clients.list().await?;

        let mut by_plan = PlanBreakdown::default();
        let mut revenue: BTreeMap<Currency, Decimal> = BTreeMap::new();
        for client in &clients {
            match client.plan {
                Plan::Start => by_plan.start += 1,
                Plan::Pro => by_plan.pro += 1,
            }
            let total = revenue.entry(client.currency).or_default();
            *total = total.checked_add(client.monthly_value).ok_or_else(|| {
                anyhow::anyhow!("Soma da receita mensal em {:?} estourou o limite", client.currency)
            })?;
        }

        Ok(AdminOverview {
            total_clients: clients.len(),
            clients_by_plan: by_plan,
            monthly_revenue: revenue
                .into_iter()
                .map(|(currency, total)| CurrencyTotal { currency, total })
                .collect(),
            total_reports: self.reports.list().await?.len(),
            unread_messages: self.inbox.unread_count().await?,
        })
    }
}
