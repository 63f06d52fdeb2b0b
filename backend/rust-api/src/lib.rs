use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

/// CSP middleware adds Content-Security-Policy header to all responses
async fn csp_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: https:; \
             connect-src 'self'",
        ),
    );
    response
}

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        // Auth endpoints (mixed: some public, some protected)
        .nest("/api/v1/auth", auth_routes(app_state.clone()))
        // Protected exam API (require JWT)
        .nest(
            "/api/v1/exams",
            exam_routes()
                .layer(cors)
                .layer(middleware::from_fn_with_state(
                    app_state.clone(),
                    middlewares::rate_limit::rate_limit_middleware,
                ))
                .layer(middleware::from_fn_with_state(
                    app_state.clone(),
                    middlewares::auth::auth_middleware,
                )),
        )
        .with_state(app_state)
        .layer(middleware::from_fn(csp_middleware)) // Apply CSP to all responses
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn exam_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        // Exam management
        .route(
            "/",
            get(handlers::exams::list_exams).post(handlers::exams::create_exam),
        )
        .route("/{id}", get(handlers::exams::get_exam))
        .route("/{id}/publish", post(handlers::exams::publish_exam))
        .route("/{id}/schedule", put(handlers::exams::update_schedule))
        .route(
            "/{id}/schedule/validate",
            post(handlers::exams::validate_schedule_preview),
        )
        // Questions
        .route(
            "/{id}/questions",
            get(handlers::questions::list_questions).post(handlers::questions::add_question),
        )
        .route(
            "/{id}/questions/{question_id}",
            delete(handlers::questions::delete_question),
        )
        // Taking the exam
        .route("/{id}/access", get(handlers::submissions::check_access))
        .route(
            "/{id}/submissions",
            get(handlers::submissions::list_submissions).post(handlers::submissions::submit_exam),
        )
        // Grading & finalization
        .route(
            "/{id}/submissions/{student_id}",
            get(handlers::grading::get_submission),
        )
        .route(
            "/{id}/submissions/{student_id}/grades",
            put(handlers::grading::record_grades),
        )
        .route("/{id}/grading-lock", get(handlers::grading::grading_lock))
        .route("/{id}/finalize", post(handlers::grading::finalize_exam))
        // Results
        .route("/{id}/results/me", get(handlers::results::my_result))
        .route("/{id}/statistics", get(handlers::results::class_statistics))
}

fn auth_routes(
    app_state: std::sync::Arc<services::AppState>,
) -> Router<std::sync::Arc<services::AppState>> {
    // Public routes with rate limiting
    let register_route = Router::new()
        .route("/register", post(handlers::auth::register))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::rate_limit::register_rate_limit_middleware,
        ));

    let login_route = Router::new()
        .route("/login", post(handlers::auth::login))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::rate_limit::login_rate_limit_middleware,
        ));

    let public_routes = register_route.merge(login_route);

    // Protected routes (require JWT auth)
    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::auth::auth_middleware,
        ));

    public_routes.merge(protected_routes)
}
