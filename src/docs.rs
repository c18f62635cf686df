// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::forgot_password,
        handlers::auth::oauth_url,

        // --- Contact ---
        handlers::messages::submit_contact,
        handlers::messages::whatsapp_link,

        // --- Admin ---
        handlers::dashboard::get_overview,
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::reports::list_reports,
        handlers::reports::upload_report,
        handlers::messages::list_messages,
        handlers::messages::mark_message_read,
        handlers::messages::delete_message,

        // --- Portal ---
        handlers::clients::get_my_profile,
        handlers::reports::list_my_reports,
        handlers::reports::download_report,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::Principal,
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::ForgotPasswordPayload,
            models::auth::ForgotPasswordResponse,
            models::auth::RecoveryChannel,
            models::auth::OAuthResponse,

            // --- Clients ---
            models::client::Plan,
            models::client::Currency,
            models::client::ClientProfile,
            models::client::CreateClientPayload,
            models::client::UpdateClientPayload,

            // --- Reports ---
            models::report::Report,
            handlers::reports::ReportUploadForm,

            // --- Messages ---
            models::message::MessageStatus,
            models::message::MessageKind,
            models::message::Message,
            models::message::ContactPayload,
            models::message::ContactReceipt,
            models::message::WhatsAppLink,

            // --- Dashboard ---
            models::dashboard::AdminOverview,
            models::dashboard::PlanBreakdown,
            models::dashboard::CurrencyTotal,
        )
    ),
    tags(
        (name = "Auth", description = "Login, sessão e recuperação de senha"),
        (name = "Contact", description = "Formulário de contato e WhatsApp do site"),
        (name = "Clients", description = "Cadastro de clientes (admin)"),
        (name = "Reports", description = "Relatórios de performance"),
        (name = "Messages", description = "Caixa de entrada do admin"),
        (name = "Portal", description = "Área do cliente"),
        (name = "Dashboard", description = "Indicadores do painel do admin")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
