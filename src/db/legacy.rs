// src/db/legacy.rs
//
// Converte o formato antigo (arrays JSON sem envelope, ids por timestamp,
// senhas em texto puro, relatórios ligados ao cliente pelo nome) para o
// esquema versionado. Roda uma vez na subida; coleções já migradas são ignoradas.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    common::{error::AppError, password::hash_password},
    db::{
        client_repo::ClientRepository, collection::Snapshot, message_repo::MessageRepository,
        report_repo::ReportRepository, store::validate_key,
    },
    models::{
        client::{Client, Currency, Plan, MAX_MONTHLY_VALUE},
        message::{Message, MessageKind, MessageStatus},
        report::{file_url_for, Report},
    },
};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub clients: usize,
    pub reports: usize,
    pub orphan_reports: usize,
    pub messages: usize,
}

pub async fn migrate_legacy_collections(
    clients: &ClientRepository,
    reports: &ReportRepository,
    messages: &MessageRepository,
    bcrypt_cost: u32,
) -> Result<MigrationSummary, AppError> {
    let mut summary = MigrationSummary::default();

    // Clientes primeiro: os relatórios precisam dos ids definitivos.
    if let Snapshot::Legacy(items) = clients.collection().snapshot().await? {
        let migrated = convert_clients(items, bcrypt_cost).await?;
        summary.clients = migrated.len();
        clients.collection().replace(&migrated).await?;
        tracing::info!("🔁 {} clientes migrados para o esquema versionado", summary.clients);
    }

    if let Snapshot::Legacy(items) = reports.collection().snapshot().await? {
        let current_clients = clients.list().await?;
        let migrated = convert_reports(items, &current_clients);
        summary.reports = migrated.len();
        summary.orphan_reports = migrated.iter().filter(|r| r.client_id.is_none()).count();
        reports.collection().replace(&migrated).await?;
        tracing::info!(
            "🔁 {} relatórios migrados ({} sem cliente correspondente)",
            summary.reports,
            summary.orphan_reports
        );
    }

    if let Snapshot::Legacy(items) = messages.collection().snapshot().await? {
        let migrated = convert_messages(items);
        summary.messages = migrated.len();
        messages.collection().replace(&migrated).await?;
        tracing::info!("🔁 {} mensagens migradas", summary.messages);
    }

    Ok(summary)
}

// --- conversores ---

async fn convert_clients(items: Vec<Value>, bcrypt_cost: u32) -> Result<Vec<Client>, AppError> {
    let mut seen_ids = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    let now = Utc::now();

    for item in items {
        let Value::Object(obj) = item else {
            tracing::warn!("Registro de cliente legado ignorado: não é um objeto");
            continue;
        };

        let id = unique_id(text(&obj, "id"), &mut seen_ids, "Cliente");

        // Sem senha gravada: gera um hash de um segredo aleatório, ninguém entra com ele.
        let secret = text(&obj, "password").unwrap_or_else(|| Uuid::new_v4().to_string());
        let password_hash = hash_password(&secret, bcrypt_cost).await?;

        let mut monthly_value = obj.get("monthlyValue").and_then(decimal).unwrap_or_default();
        if monthly_value.is_sign_negative() {
            tracing::warn!("Cliente legado '{}' com valor mensal negativo, zerado", id);
            monthly_value = Decimal::ZERO;
        } else if monthly_value > MAX_MONTHLY_VALUE {
            tracing::warn!("Cliente legado '{}' com valor mensal acima do teto, limitado", id);
            monthly_value = MAX_MONTHLY_VALUE;
        }

        out.push(Client {
            id,
            name: text(&obj, "name").unwrap_or_default(),
            email: text(&obj, "email").unwrap_or_default(),
            phone: text(&obj, "phone").unwrap_or_default(),
            password_hash,
            plan: match text(&obj, "plan").as_deref() {
                Some("Pro") | Some("pro") => Plan::Pro,
                _ => Plan::Start,
            },
            currency: text(&obj, "currency")
                .and_then(|c| serde_json::from_value(Value::String(c.to_uppercase())).ok())
                .unwrap_or(Currency::BRL),
            monthly_value,
            start_date: obj
                .get("startDate")
                .and_then(date)
                .unwrap_or_else(|| now.date_naive()),
            created_at: now,
            updated_at: now,
        });
    }

    Ok(out)
}

fn convert_reports(items: Vec<Value>, clients: &[Client]) -> Vec<Report> {
    let mut seen_ids = HashSet::new();
    let mut out = Vec::with_capacity(items.len());

    for item in items {
        let Value::Object(obj) = item else {
            tracing::warn!("Registro de relatório legado ignorado: não é um objeto");
            continue;
        };

        // O id também vira a chave do arquivo (`reportFiles/<id>`).
        let id = unique_id(text(&obj, "id"), &mut seen_ids, "Relatório");
        let client_name = text(&obj, "clientName").unwrap_or_default();

        // Chave estrangeira única: o id gravado, se ainda existir; senão o nome resolvido agora.
        let client = text(&obj, "clientId")
            .and_then(|cid| clients.iter().find(|c| c.id == cid))
            .or_else(|| clients.iter().find(|c| !client_name.is_empty() && c.name == client_name));

        if client.is_none() {
            tracing::warn!("Relatório legado '{}' sem cliente correspondente ('{}')", id, client_name);
        }

        let title = text(&obj, "title").unwrap_or_default();
        out.push(Report {
            client_id: client.map(|c| c.id.clone()),
            client_name,
            date: obj.get("date").and_then(datetime).unwrap_or_else(Utc::now),
            file_url: file_url_for(&id),
            file_name: title.clone(),
            content_type: "application/octet-stream".to_string(),
            // O arquivo antigo era um object URL do navegador; não sobrevive.
            size: 0,
            title,
            id,
        });
    }

    out
}

fn convert_messages(items: Vec<Value>) -> Vec<Message> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(obj),
            _ => {
                tracing::warn!("Mensagem legada ignorada: não é um objeto");
                None
            }
        })
        .map(|obj| Message {
            id: text(&obj, "id").unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: text(&obj, "name").unwrap_or_default(),
            email: text(&obj, "email").unwrap_or_default(),
            phone: text(&obj, "phone").filter(|p| !p.is_empty()),
            message: text(&obj, "message").unwrap_or_default(),
            date: obj.get("date").and_then(datetime).unwrap_or_else(Utc::now),
            status: match text(&obj, "status").as_deref() {
                Some("Respondido") => MessageStatus::Respondido,
                _ => MessageStatus::Novo,
            },
            kind: match text(&obj, "type").as_deref() {
                Some("password-recovery") => Some(MessageKind::PasswordRecovery),
                Some("contact") => Some(MessageKind::Contact),
                _ => None,
            },
        })
        .collect()
}

// Ids por timestamp podiam colidir. Ausente, repetido ou inválido como chave: id novo.
fn unique_id(raw: Option<String>, seen: &mut HashSet<String>, kind: &str) -> String {
    let raw = raw.unwrap_or_default();
    if !raw.is_empty() && validate_key(&raw).is_ok() && seen.insert(raw.clone()) {
        return raw;
    }
    let fresh = Uuid::new_v4().to_string();
    tracing::warn!("{} legado com id ausente, repetido ou inválido '{}', novo id {}", kind, raw, fresh);
    seen.insert(fresh.clone());
    fresh
}

// --- leitura tolerante de campos ---

fn text(obj: &Map<String, Value>, field: &str) -> Option<String> {
    match obj.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim().replace(',', ".").as_str()).ok(),
        _ => None,
    }
}

fn date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%d/%m/%Y").ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
}

fn datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc))
            .or_else(|| {
                date(value).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|d| d.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        common::password::verify_password,
        db::{memory_store::MemoryStore, store::SharedStore},
    };

    struct Repos {
        store: SharedStore,
        clients: ClientRepository,
        reports: ReportRepository,
        messages: MessageRepository,
    }

    fn repos() -> Repos {
        let store: SharedStore = Arc::new(MemoryStore::new());
        Repos {
            clients: ClientRepository::new(store.clone()),
            reports: ReportRepository::new(store.clone()),
            messages: MessageRepository::new(store.clone()),
            store,
        }
    }

    async fn put_json(store: &SharedStore, key: &str, value: Value) {
        store.put(key, serde_json::to_vec(&value).unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn migrates_browser_layout() {
        let r = repos();
        put_json(
            &r.store,
            "adminClients",
            json!([
                {"id": 1712000000000u64, "name": "Ana", "email": "ana@x.com", "phone": "11",
                 "password": "p1", "plan": "Pro", "currency": "usd", "monthlyValue": "1500,50",
                 "startDate": "2025-01-15"},
                {"id": 1712000000000u64, "name": "Bruno", "email": "bruno@x.com", "password": "p2",
                 "monthlyValue": -3}
            ]),
        )
        .await;
        put_json(
            &r.store,
            "adminReports",
            json!([
                {"id": "r1", "clientName": "Ana", "title": "Março", "date": "2025-03-01T10:00:00Z",
                 "fileUrl": "blob:http://localhost/abc"},
                {"id": "r2", "clientName": "Fantasma", "title": "Abril", "date": 1712000000000u64}
            ]),
        )
        .await;
        put_json(
            &r.store,
            "formMessages",
            json!([
                {"id": "m1", "name": "Carlos", "email": "c@x.com", "message": "Oi",
                 "date": "2025-03-01T10:00:00Z", "status": "Respondido"},
                {"id": "m2", "name": "Ana", "email": "ana@x.com", "message": "Esqueci a senha",
                 "date": "2025-03-02T10:00:00Z", "status": "Novo", "type": "password-recovery"}
            ]),
        )
        .await;

        let summary = migrate_legacy_collections(&r.clients, &r.reports, &r.messages, 4)
            .await
            .unwrap();
        assert_eq!(
            summary,
            MigrationSummary { clients: 2, reports: 2, orphan_reports: 1, messages: 2 }
        );

        let clients = r.clients.list().await.unwrap();
        assert_eq!(clients[0].id, "1712000000000");
        assert_ne!(clients[1].id, clients[0].id);
        assert_eq!(clients[0].plan, Plan::Pro);
        assert_eq!(clients[0].currency, Currency::USD);
        assert_eq!(clients[0].monthly_value, Decimal::from_str("1500.50").unwrap());
        assert_eq!(clients[1].monthly_value, Decimal::ZERO);
        assert!(verify_password("p1", &clients[0].password_hash).await.unwrap());

        // Relatório ligado só pelo nome passa a ter a chave estrangeira.
        let for_ana = r.reports.list_by_client(&clients[0].id).await.unwrap();
        assert_eq!(for_ana.len(), 1);
        assert_eq!(for_ana[0].id, "r1");
        assert_eq!(for_ana[0].file_url, "/api/reports/r1/file");

        let messages = r.messages.list().await.unwrap();
        assert_eq!(messages[0].status, MessageStatus::Respondido);
        assert_eq!(messages[1].kind, Some(MessageKind::PasswordRecovery));
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let r = repos();
        put_json(&r.store, "formMessages", json!([{"id": "m1", "name": "A", "email": "a@x.com",
            "message": "x", "date": "2025-03-01T10:00:00Z", "status": "Novo"}])).await;

        let first = migrate_legacy_collections(&r.clients, &r.reports, &r.messages, 4).await.unwrap();
        let second = migrate_legacy_collections(&r.clients, &r.reports, &r.messages, 4).await.unwrap();
        assert_eq!(first.messages, 1);
        assert_eq!(second, MigrationSummary::default());
        assert_eq!(r.messages.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn caps_oversized_monthly_value() {
        let r = repos();
        put_json(&r.store, "adminClients", json!([
            {"id": "c1", "name": "Ana", "email": "ana@x.com", "password": "p1",
             "monthlyValue": "50000000000000000000000000000"}
        ])).await;

        migrate_legacy_collections(&r.clients, &r.reports, &r.messages, 4).await.unwrap();
        assert_eq!(r.clients.list().await.unwrap()[0].monthly_value, MAX_MONTHLY_VALUE);
    }

    #[tokio::test]
    async fn colliding_report_ids_get_fresh_ones() {
        let r = repos();
        put_json(&r.store, "adminReports", json!([
            {"id": 1712000000000u64, "clientName": "Ana", "title": "Março"},
            {"id": 1712000000000u64, "clientName": "Ana", "title": "Abril"}
        ])).await;

        migrate_legacy_collections(&r.clients, &r.reports, &r.messages, 4).await.unwrap();

        let reports = r.reports.list().await.unwrap();
        assert_eq!(reports[0].id, "1712000000000");
        assert_ne!(reports[1].id, reports[0].id);
        assert_eq!(reports[1].file_url, format!("/api/reports/{}/file", reports[1].id));
        let found = r.reports.find_by_id(&reports[1].id).await.unwrap().unwrap();
        assert_eq!(found.title, "Abril");
    }
}
