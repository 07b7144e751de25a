// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "es";

// Extrator de idioma (só o código primário: "pt-BR" -> "pt")
pub struct Locale(pub String);

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str).first().map(|tag| {
                    tag.split('-').next().unwrap_or(tag).to_lowercase()
                })
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Ok(Locale(lang))
    }
}
