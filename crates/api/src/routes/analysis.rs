use axum::routing::{get, post};
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analysis::submit_analysis))
        .route("/tasks/{task_id}", get(analysis::get_task))
        .route("/results/{task_id}", get(analysis::get_result))
}
