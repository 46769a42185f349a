//! One-shot flash messages for form posts, carried in a short-lived cookie.

use axum::http::{header, HeaderMap};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

pub const FLASH_COOKIE: &str = "mediapanel_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    fn tag(self) -> char {
        match self {
            FlashKind::Success => 's',
            FlashKind::Error => 'e',
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            FlashKind::Success => "mediapanel-flash-success",
            FlashKind::Error => "mediapanel-flash-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// `Set-Cookie` value carrying this message back to the index page.
    pub fn to_cookie(&self) -> String {
        format!(
            "{}={}{}; Path=/media; Max-Age=60; HttpOnly; SameSite=Lax",
            FLASH_COOKIE,
            self.kind.tag(),
            utf8_percent_encode(&self.message, NON_ALPHANUMERIC)
        )
    }

    /// `Set-Cookie` value that consumes the flash.
    pub const CLEAR_COOKIE: &'static str = "mediapanel_flash=; Path=/media; Max-Age=0; HttpOnly; SameSite=Lax";

    pub fn from_headers(headers: &HeaderMap) -> Option<Flash> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .and_then(|(_, value)| Self::decode(value))
    }

    fn decode(value: &str) -> Option<Flash> {
        let mut chars = value.chars();
        let kind = match chars.next()? {
            's' => FlashKind::Success,
            'e' => FlashKind::Error,
            _ => return None,
        };
        let message = percent_decode_str(chars.as_str())
            .decode_utf8_lossy()
            .into_owned();
        (!message.is_empty()).then_some(Flash { kind, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_carries_message() {
        let flash = Flash::error("Media upload failed: File size exceeds maximum allowed size of 5120 KB");
        let set_cookie = flash.to_cookie();
        let pair = set_cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}", pair)).unwrap(),
        );

        assert_eq!(Flash::from_headers(&headers), Some(flash));
    }

    #[test]
    fn test_cleared_or_foreign_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("mediapanel_flash=; other=1"),
        );
        assert_eq!(Flash::from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("mediapanel_flash=xhello"));
        assert_eq!(Flash::from_headers(&headers), None);
    }
}
