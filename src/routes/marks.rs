use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::handlers::marks;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/process-image", post(marks::process_image))
        .route("/marks/:section/:usn/:subject", get(marks::get_marks))
        .route_layer(from_fn_with_state(state, auth_middleware))
}
