//! MediaPanel HTTP service
//!
//! Library target so integration tests can build the router against a
//! disposable database; the `mediapanel` binary only wires configuration.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;
pub mod views;

pub use error::{HttpAppError, ValidatedJson};
pub use services::MediaService;
pub use state::AppState;
