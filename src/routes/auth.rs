use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::handlers::auth;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route(
            "/update-password",
            post(auth::update_password)
                .route_layer(from_fn_with_state(state, auth_middleware)),
        )
}
