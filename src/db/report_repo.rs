// src/db/report_repo.rs

use crate::{
    common::error::AppError,
    db::{collection::Collection, store::SharedStore},
    models::report::Report,
};

pub const REPORTS_KEY: &str = "adminReports";
const REPORT_FILES_PREFIX: &str = "reportFiles";

#[derive(Clone)]
pub struct ReportRepository {
    reports: Collection<Report>,
    store: SharedStore,
}

impl ReportRepository {
    pub fn new(store: SharedStore) -> Self {
        Self {
            reports: Collection::new(store.clone(), REPORTS_KEY),
            store,
        }
    }

    pub fn collection(&self) -> &Collection<Report> {
        &self.reports
    }

    fn file_key(report_id: &str) -> String {
        format!("{REPORT_FILES_PREFIX}/{report_id}")
    }

    pub async fn list(&self) -> Result<Vec<Report>, AppError> {
        self.reports.load().await
    }

    pub async fn list_by_client(&self, client_id: &str) -> Result<Vec<Report>, AppError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.client_id.as_deref() == Some(client_id))
            .collect())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Report>, AppError> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    // O binário é gravado antes do registro: um relatório listado sempre tem arquivo.
    pub async fn insert(&self, report: Report, bytes: Vec<u8>) -> Result<Report, AppError> {
        let file_key = Self::file_key(&report.id);
        self.store.put(&file_key, bytes).await?;

        let result = self
            .reports
            .mutate(move |reports| {
                reports.push(report.clone());
                Ok(report)
            })
            .await;

        if result.is_err() {
            if let Err(e) = self.store.remove(&file_key).await {
                tracing::warn!("Arquivo órfão '{}' não pôde ser removido: {}", file_key, e);
            }
        }
        result
    }

    pub async fn load_file(&self, report_id: &str) -> Result<Option<Vec<u8>>, AppError> {
        self.store.get(&Self::file_key(report_id)).await
    }
}
