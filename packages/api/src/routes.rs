//! The service's HTTP surface.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{account, demo, health, ratings, students};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/signup", post(account::signup))
        .route("/login", post(account::login))
        .route("/logout", post(account::logout))
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/students/{id}", get(students::get_student))
        .route("/ratings", post(ratings::add_rating))
        .route("/init-demo", post(demo::init_demo))
        .route("/stats", get(students::stats))
        .with_state(state)
}
