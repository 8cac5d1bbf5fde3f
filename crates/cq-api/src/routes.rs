//! API route definitions

use crate::auth::middleware::auth_middleware;
use crate::handlers::{auth, food_log, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Create the routes mounted under `/api`
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/users/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        // Users
        .route("/users/all", get(users::list_users))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/users/profile/goals", put(users::update_goals))
        .route("/users/profile/target", get(users::get_calorie_target))
        // Food log
        .route(
            "/food/log",
            post(food_log::create_log).get(food_log::list_logs),
        )
        .route(
            "/food/log/:id",
            get(food_log::get_log)
                .put(food_log::update_log)
                .delete(food_log::delete_log),
        )
        .route("/food/summary", get(food_log::daily_summary))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
