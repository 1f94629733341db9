pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::listing::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Listing sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            delete(handlers::handle_end_session),
        )
        .route("/api/v1/sessions/:id/view", get(handlers::handle_get_view))
        .route(
            "/api/v1/sessions/:id/pills",
            post(handlers::handle_add_pill).delete(handlers::handle_remove_pill),
        )
        .route(
            "/api/v1/sessions/:id/industry",
            put(handlers::handle_select_industry).delete(handlers::handle_clear_industry),
        )
        .route(
            "/api/v1/sessions/:id/excluded-terms/toggle",
            post(handlers::handle_toggle_excluded_term),
        )
        .route(
            "/api/v1/sessions/:id/excluded-terms",
            delete(handlers::handle_clear_excluded_terms),
        )
        .route("/api/v1/sessions/:id/page", put(handlers::handle_set_page))
        .route("/api/v1/sessions/:id/clicks", post(handlers::handle_job_click))
        // Taxonomy
        .route("/api/v1/industries", get(handlers::handle_list_industries))
        .route(
            "/api/v1/industries/:label/keywords",
            get(handlers::handle_industry_keywords),
        )
        // Jobs
        .route("/api/v1/jobs/search", get(handlers::handle_search_preview))
        .route("/api/v1/jobs/refresh", post(handlers::handle_refresh))
        .with_state(state)
}
