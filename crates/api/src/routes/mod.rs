pub mod analysis;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST   /analyze                 -> submit_analysis
/// GET    /tasks/{task_id}         -> get_task
/// GET    /results/{task_id}       -> get_result
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(analysis::router())
}
