// src/routes.rs

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{admin_guard, auth_guard, client_guard},
};

async fn health(State(app_state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "storage": app_state.store.backend_name(),
        "externalAuth": app_state.auth_service.has_external_provider(),
    }))
}

pub fn app(app_state: AppState) -> Router {
    // Site público: login, recuperação de senha, contato
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/api/auth/oauth/{provider}", get(handlers::auth::oauth_url))
        .route("/api/contact", post(handlers::messages::submit_contact))
        .route("/api/contact/whatsapp", get(handlers::messages::whatsapp_link));

    // Qualquer sessão válida
    let session_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/reports/{id}/file", get(handlers::reports::download_report))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/overview", get(handlers::dashboard::get_overview))
        .route(
            "/api/admin/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/admin/clients/{id}",
            put(handlers::clients::update_client).delete(handlers::clients::delete_client),
        )
        .route(
            "/api/admin/reports",
            get(handlers::reports::list_reports).post(handlers::reports::upload_report).layer(
                DefaultBodyLimit::max(handlers::reports::MAX_UPLOAD_BYTES),
            ),
        )
        .route("/api/admin/messages", get(handlers::messages::list_messages))
        .route("/api/admin/messages/{id}", delete(handlers::messages::delete_message))
        .route(
            "/api/admin/messages/{id}/read",
            post(handlers::messages::mark_message_read),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            admin_guard,
        ));

    let portal_routes = Router::new()
        .route("/api/portal/me", get(handlers::clients::get_my_profile))
        .route("/api/portal/reports", get(handlers::reports::list_my_reports))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            client_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .merge(portal_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{app, Router};
    use crate::config::test_support::{self, ADMIN_PASSWORD};

    const BOUNDARY: &str = "relatorio-boundary";

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        read_json(router, request).await
    }

    async fn read_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(router: &Router, identifier: &str, password: &str) -> String {
        let (status, body) = send(
            router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "identifier": identifier, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_client(router: &Router, admin: &str, name: &str, email: &str) -> String {
        let (status, body) = send(
            router,
            "POST",
            "/api/admin/clients",
            Some(admin),
            Some(json!({
                "name": name,
                "email": email,
                "password": "p1",
                "plan": "Pro",
                "currency": "BRL",
                "monthlyValue": 1500
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    fn upload_request(token: &str, client_id: &str, title: &str, file: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in [("clientId", client_id), ("title", title)] {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"marco.pdf\"\r\n\
                 Content-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/admin/reports")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_storage_backend() {
        let router = app(test_support::app_state().await);
        let (status, body) = send(&router, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"], "memory");
        assert_eq!(body["externalAuth"], false);
    }

    #[tokio::test]
    async fn admin_registers_client_who_then_logs_into_portal() {
        let router = app(test_support::app_state().await);
        let admin = login(&router, "admin", ADMIN_PASSWORD).await;
        let ana_id = create_client(&router, &admin, "Ana Souza", "ana@empresa.com.br").await;

        let (status, body) = send(
            &router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ANA@empresa.com.br", "password": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "client");
        assert_eq!(body["redirectTo"], "/client");
        assert_eq!(body["client"]["id"], ana_id.as_str());
        assert!(body["client"].get("passwordHash").is_none());
        let ana = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&router, "GET", "/api/portal/me", Some(&ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ana Souza");

        let (status, body) = send(&router, "GET", "/api/portal/reports", Some(&ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn guards_reject_missing_token_and_wrong_role() {
        let router = app(test_support::app_state().await);
        let admin = login(&router, "admin", ADMIN_PASSWORD).await;
        create_client(&router, &admin, "Ana", "ana@x.com").await;
        let ana = login(&router, "ana@x.com", "p1").await;

        let (status, body) = send(&router, "GET", "/api/admin/clients", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_token");

        let (status, body) = send(&router, "GET", "/api/admin/clients", Some(&ana), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "forbidden");

        let (status, _) = send(&router, "GET", "/api/portal/me", Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&router, "GET", "/api/auth/me", Some("nao-e-um-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_gets_localized_generic_error() {
        let router = app(test_support::app_state().await);
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9")
            .body(Body::from(json!({ "identifier": "admin", "password": "errada" }).to_string()))
            .unwrap();

        let (status, body) = read_json(&router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_credentials");
        assert_eq!(body["error"], "E-mail ou senha inválidos.");
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let router = app(test_support::app_state().await);
        let admin = login(&router, "admin", ADMIN_PASSWORD).await;

        let (status, body) = send(&router, "GET", "/api/auth/me", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");

        let (status, _) = send(&router, "POST", "/api/auth/logout", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&router, "GET", "/api/auth/me", Some(&admin), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn contact_message_flows_into_admin_inbox() {
        let router = app(test_support::app_state().await);
        let (status, body) = send(
            &router,
            "POST",
            "/api/contact",
            None,
            Some(json!({
                "name": "Carlos Lima",
                "email": "carlos@loja.com",
                "message": "Quero um orçamento",
                "_honey": ""
            })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["received"], true);

        let admin = login(&router, "admin", ADMIN_PASSWORD).await;
        let (_, body) = send(&router, "GET", "/api/admin/overview", Some(&admin), None).await;
        assert_eq!(body["unreadMessages"], 1);

        let (status, body) = send(&router, "GET", "/api/admin/messages", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["status"], "Novo");
        assert_eq!(body[0]["type"], "contact");
        let id = body[0]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/admin/messages/{id}/read");
        let (status, _) = send(&router, "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&router, "GET", "/api/admin/messages", Some(&admin), None).await;
        assert_eq!(body[0]["status"], "Respondido");
        let (_, body) = send(&router, "GET", "/api/admin/overview", Some(&admin), None).await;
        assert_eq!(body["unreadMessages"], 0);

        let uri = format!("/api/admin/messages/{id}");
        let (status, _) = send(&router, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&router, "GET", "/api/admin/messages", Some(&admin), None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn invalid_contact_is_rejected_with_field_details() {
        let router = app(test_support::app_state().await);
        let (status, body) = send(
            &router,
            "POST",
            "/api/contact",
            None,
            Some(json!({ "name": "", "email": "nao-e-email", "message": "Oi" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
        assert!(body["details"]["name"].is_array());
        assert!(body["details"]["email"].is_array());
    }

    #[tokio::test]
    async fn uploaded_report_is_visible_only_to_its_client() {
        let router = app(test_support::app_state().await);
        let admin = login(&router, "admin", ADMIN_PASSWORD).await;
        let ana_id = create_client(&router, &admin, "Ana", "ana@x.com").await;
        create_client(&router, &admin, "Bia", "bia@x.com").await;

        let (status, report) =
            read_json(&router, upload_request(&admin, &ana_id, "Março", b"%PDF-1.4 conteudo")).await;
        assert_eq!(status, StatusCode::CREATED, "{report}");
        assert_eq!(report["clientName"], "Ana");
        assert_eq!(report["fileName"], "marco.pdf");
        let file_url = report["fileUrl"].as_str().unwrap().to_string();

        let ana = login(&router, "ana@x.com", "p1").await;
        let bia = login(&router, "bia@x.com", "p1").await;

        let (_, body) = send(&router, "GET", "/api/portal/reports", Some(&ana), None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        let (_, body) = send(&router, "GET", "/api/portal/reports", Some(&bia), None).await;
        assert_eq!(body, json!([]));

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(&file_url)
                    .header(header::AUTHORIZATION, format!("Bearer {ana}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"%PDF-1.4 conteudo");

        let (status, body) = send(&router, "GET", &file_url, Some(&bia), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "report_not_found");
    }

    #[tokio::test]
    async fn upload_without_title_lists_missing_field() {
        let router = app(test_support::app_state().await);
        let admin = login(&router, "admin", ADMIN_PASSWORD).await;
        let ana_id = create_client(&router, &admin, "Ana", "ana@x.com").await;

        let (status, body) = read_json(&router, upload_request(&admin, &ana_id, "", b"x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["title"].is_array());
        assert!(body["details"].get("file").is_none());
    }

    #[tokio::test]
    async fn deleting_client_revokes_portal_access() {
        let router = app(test_support::app_state().await);
        let admin = login(&router, "admin", ADMIN_PASSWORD).await;
        let ana_id = create_client(&router, &admin, "Ana", "ana@x.com").await;
        let ana = login(&router, "ana@x.com", "p1").await;

        let uri = format!("/api/admin/clients/{ana_id}");
        let (status, _) = send(&router, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&router, "GET", "/api/portal/me", Some(&ana), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Repetir a exclusão não é erro.
        let (status, _) = send(&router, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn oauth_without_provider_is_unavailable() {
        let router = app(test_support::app_state().await);
        let (status, body) = send(
            &router,
            "GET",
            "/api/auth/oauth/google?redirectTo=https%3A%2F%2Fsite.com%2Fclient",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "auth_provider_unavailable");
    }
}
