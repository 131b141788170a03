pub mod error;
pub mod server;

pub use error::WebhookServerError;
pub use server::{AppState, WebhookEvent, router, run};
