//! Picker widget assets, compiled into the binary.

use axum::{http::header, response::IntoResponse};

const SCRIPT: &str = include_str!("../../assets/mediapanel.js");
const STYLESHEET: &str = include_str!("../../assets/mediapanel.css");
const CACHE_CONTROL: &str = "public, max-age=3600";

pub async fn script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        SCRIPT,
    )
}

pub async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        STYLESHEET,
    )
}
