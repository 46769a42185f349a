//! Domain route groups (media, folders, widget assets).

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, put};
use axum::Router;
use std::sync::Arc;

pub fn media_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/media",
            get(handlers::media::index).post(handlers::media::store),
        )
        .route("/media/search", get(handlers::media::search))
        .route("/media/folder", get(handlers::media::by_folder))
        .route(
            "/media/{id}",
            get(handlers::media::show)
                .put(handlers::media::update)
                .delete(handlers::media::destroy),
        )
        .with_state(state)
}

pub fn folder_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/media/folders",
            get(handlers::folders::index).post(handlers::folders::store),
        )
        .route(
            "/media/folders/{id}",
            put(handlers::folders::update).delete(handlers::folders::destroy),
        )
        .with_state(state)
}

pub fn asset_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/vendor/mediapanel/mediapanel.js",
            get(handlers::assets::script),
        )
        .route(
            "/vendor/mediapanel/mediapanel.css",
            get(handlers::assets::stylesheet),
        )
}
