pub(crate) mod dto;
pub(crate) mod handlers;
pub(crate) mod permissions;
pub(crate) mod repo;
pub(crate) mod repo_types;
pub(crate) mod validate;

use crate::state::AppState;
use axum::Router;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new().merge(handlers::user_routes(state))
}
