pub mod admins;
pub mod deals;
pub mod session;

use axum::Router;

use crate::store::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(deals::router())
        .merge(admins::router())
        .merge(session::router())
}
