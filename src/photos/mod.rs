use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod store;

pub fn router() -> Router<AppState> {
    handlers::router()
}
