use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn,
    Router,
};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::{routes as auth_routes, AuthService};
use crate::features::reports::{routes as reports_routes, CommentService, ReportService, ReportState};
use crate::modules::storage::{LocalStorage, MediaKind};
use crate::shared::constants::UPLOADS_URL_PREFIX;

/// Long-lived handles shared by every request
pub struct AppServices {
    pub pool: SqlitePool,
    pub storage: LocalStorage,
    pub auth_service: Arc<AuthService>,
    pub report_service: Arc<ReportService>,
    pub comment_service: Arc<CommentService>,
}

impl AppServices {
    /// Connect, migrate and prepare the upload directory
    pub async fn init(config: &Config) -> Result<Self> {
        let pool = database::create_pool(&config.database).await?;
        tracing::info!("Database connection pool created");

        tracing::info!("Running database migrations...");
        database::run_migrations(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
        tracing::info!("Database migrations completed successfully");

        let storage = LocalStorage::new(&config.upload);
        storage.ensure_layout().await?;
        storage.clear_staging().await?;
        tracing::info!(
            "Upload storage ready at {}",
            storage.root().display()
        );

        let auth_service = Arc::new(AuthService::new(pool.clone(), &config.auth)?);
        tracing::info!("Auth service initialized");

        let report_service = Arc::new(ReportService::new(pool.clone()));
        let comment_service = Arc::new(CommentService::new(pool.clone()));
        tracing::info!("Report services initialized");

        Ok(Self {
            pool,
            storage,
            auth_service,
            report_service,
            comment_service,
        })
    }
}

/// Health check endpoint (no auth required); fails when the database does not answer
async fn health_check(State(pool): State<SqlitePool>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Health check failed: {:?}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Compose the feature routers, docs, static media and global layers
pub fn build_router(services: &AppServices, config: &Config) -> Router {
    let report_state = ReportState {
        report_service: Arc::clone(&services.report_service),
        comment_service: Arc::clone(&services.comment_service),
        storage: services.storage.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    }
    .modify(&mut openapi);

    // Build swagger router
    let swagger = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        swagger.layer(from_fn(middleware::basic_auth_middleware(
            Arc::new(credentials),
            "Swagger UI",
        )))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        swagger
    };

    let mut app = Router::new()
        .merge(swagger)
        .merge(auth_routes::routes(Arc::clone(&services.auth_service)))
        .merge(reports_routes::routes(
            report_state.clone(),
            config.upload.max_submission_size(),
        ))
        .merge(
            Router::new()
                .route("/health", axum::routing::get(health_check))
                .with_state(services.pool.clone()),
        );

    if let Some(credentials) = config.admin.credentials() {
        tracing::info!("Admin routes enabled");
        app = app.nest(
            "/api/admin",
            reports_routes::admin_routes(report_state).layer(from_fn(
                middleware::basic_auth_middleware(Arc::new(credentials), "CivicSync admin"),
            )),
        );
    } else {
        tracing::info!("Admin routes disabled (no credentials configured)");
    }

    // Committed media only; staged files are never reachable
    for kind in [MediaKind::Image, MediaKind::Audio] {
        app = app.nest_service(
            &format!("/{}/{}", UPLOADS_URL_PREFIX, kind.dir_name()),
            ServeDir::new(services.storage.media_dir(kind)),
        );
    }

    app.layer(middleware::cors_layer(
        config.app.cors_allowed_origins.clone(),
    ))
    .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
    .layer(
        ServiceBuilder::new()
            // Generate X-Request-Id using UUID v7 (or use client-provided one)
            .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(middleware::MakeSpanWithRequestId)
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            // Propagate X-Request-Id to response headers
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}
