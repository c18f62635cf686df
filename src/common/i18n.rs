// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["pt", "en", "es"];

// Tabelas de mensagens exibidas ao usuário (toasts, erros de formulário).
// Copy de marketing não mora aqui, só o que a API devolve.
const MESSAGES: &[(&str, &str, &str, &str)] = &[
    // (chave, pt, en, es)
    ("error.validation_error", "Um ou mais campos são inválidos.", "One or more fields are invalid.", "Uno o más campos no son válidos."),
    ("error.invalid_credentials", "E-mail ou senha inválidos.", "Invalid email or password.", "Correo o contraseña inválidos."),
    ("error.invalid_token", "Sessão inválida ou expirada. Faça login novamente.", "Invalid or expired session. Please sign in again.", "Sesión inválida o expirada. Inicie sesión de nuevo."),
    ("error.forbidden", "Você não tem permissão para esta ação.", "You are not allowed to do this.", "No tiene permiso para esta acción."),
    ("error.client_not_found", "Cliente não encontrado.", "Client not found.", "Cliente no encontrado."),
    ("error.report_not_found", "Relatório não encontrado.", "Report not found.", "Informe no encontrado."),
    ("error.invalid_upload", "Não foi possível ler o arquivo enviado.", "The uploaded file could not be read.", "No se pudo leer el archivo enviado."),
    ("error.network_error", "Falha ao enviar. Verifique sua conexão e tente novamente.", "Sending failed. Check your connection and try again.", "Error al enviar. Verifique su conexión e inténtelo de nuevo."),
    ("error.auth_provider_unavailable", "Este recurso não está disponível no momento.", "This feature is not available right now.", "Esta función no está disponible en este momento."),
    ("error.auth_provider_error", "O serviço de autenticação retornou um erro.", "The authentication service returned an error.", "El servicio de autenticación devolvió un error."),
    ("error.internal_error", "Ocorreu um erro inesperado.", "An unexpected error occurred.", "Ocurrió un error inesperado."),
    ("validation.required", "Campo obrigatório.", "This field is required.", "Campo obligatorio."),
    ("validation.invalid_email", "E-mail inválido.", "Invalid email address.", "Correo electrónico inválido."),
    ("validation.non_negative", "O valor não pode ser negativo.", "The value cannot be negative.", "El valor no puede ser negativo."),
    ("validation.too_large", "O valor é grande demais.", "The value is too large.", "El valor es demasiado grande."),
    ("whatsapp.greeting", "Olá! Vim pelo site e gostaria de saber mais sobre os serviços.", "Hi! I found you through the website and would like to know more about your services.", "¡Hola! Vine por el sitio web y me gustaría saber más sobre los servicios."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    // idioma -> (chave -> mensagem)
    tables: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut tables: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for &(key, pt, en, es) in MESSAGES {
            tables.entry("pt").or_default().insert(key, pt);
            tables.entry("en").or_default().insert(key, en);
            tables.entry("es").or_default().insert(key, es);
        }
        Self { tables }
    }

    /// Busca a mensagem no idioma pedido; cai para o inglês e, por último, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANGUAGE, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.tables.get(lang).and_then(|t| t.get(key)).copied()
    }
}
