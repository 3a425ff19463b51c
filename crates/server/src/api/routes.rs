use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::auth_middleware, middleware::metrics_middleware, queue};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Visitor and display routes: no credentials required.
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/tickets", post(queue::take_ticket))
        .route("/tickets/{id}", get(queue::get_ticket))
        .route("/queue", get(queue::get_queue));

    // Staff routes: behind the configured authenticator.
    let staff_routes = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/queue/mode", put(queue::set_mode))
        .route("/queue/call-next", post(queue::call_next_one_stage))
        .route(
            "/queue/call-for-assignment",
            post(queue::call_next_for_assignment),
        )
        .route("/tickets/{id}/assign", post(queue::assign_ticket))
        .route("/rooms/{room_id}/call-next", post(queue::call_next_in_room))
        .route("/queue/reset", post(queue::reset_queue))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes
        .merge(staff_routes)
        .with_state(state.clone());

    // Display boards and ticket kiosks are served from other origins.
    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
