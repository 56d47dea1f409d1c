//! # shopctl: back-office console for retail and repair shops
//!
//! `shopctl` is a server-rendered web console that sits in front of a shop's JSON API. The API
//! owns all data and business rules; this crate turns its endpoints into HTML pages: a sales
//! dashboard, CRUD screens for the catalogue and operational records, company settings, SMS
//! credit top-ups through Paystack, report previews, device swaps, and a handful of super-admin
//! tools.
//!
//! ## Request Flow
//!
//! Every page request goes through the same steps:
//!
//! 1. The [`Credentials`](auth::Credentials) extractor picks up the caller's bearer token
//!    (`Authorization` header or token cookie) and upstream session cookie. Without either, the
//!    request ends in an [`Error::Unauthenticated`](errors::Error).
//! 2. The handler calls the shop API through [`ShopApi`](upstream::ShopApi), forwarding those
//!    credentials. Upstream envelopes (`{"success": false, "error": ...}`), HTTP failures, and
//!    network errors are all mapped onto [`Error`](errors::Error).
//! 3. The result is formatted (currency, dates, percentages) and rendered through the
//!    [`Views`](views::Views) template environment.
//!
//! The [`login_redirect`](auth::middleware::login_redirect) middleware wraps the whole router:
//! any unauthenticated outcome, whether from a missing cookie or the shop API rejecting an
//! expired token, becomes a redirect to the configured login page with a `next` parameter.
//!
//! Form posts follow post/redirect/get. Successful writes answer `303 See Other` with a
//! `?success=` banner; rejected input re-renders the form with the submitted values.
//!
//! ## Core Components
//!
//! - [`api`]: page handlers and the shop API payload models
//! - [`auth`]: credential extraction and the login redirect
//! - [`config`]: YAML + environment configuration via figment
//! - [`upstream`]: the typed shop API client
//! - [`views`]: templates, banners, pagination and the entity registry
//! - [`format`]: money, percentage, number and date formatting
//!
//! ## Getting Started
//!
//! ```no_run
//! use shopctl::{Application, Config};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let app = Application::new(config)?;
//! app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod format;
mod static_assets;
pub mod telemetry;
pub mod types;
pub mod upstream;
pub mod views;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use axum::{
    Router,
    extract::OriginalUri,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument};

use crate::{
    api::handlers::{admin, companies, dashboard, entities, reports, settings, sms, static_assets as assets, swaps},
    auth::middleware::login_redirect,
    errors::Error,
    upstream::ShopApi,
    views::Views,
};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .api(Arc::new(ShopApi::new(&config.api)?))
///     .views(Views::new(&config.display)?)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub api: Arc<ShopApi>,
    pub views: Views,
}

/// Unmatched paths render the error page rather than an empty 404.
async fn not_found(OriginalUri(uri): OriginalUri) -> Error {
    Error::NotFound {
        resource: "Page".to_string(),
        id: uri.path().to_string(),
    }
}

/// Build the console router with all pages and middleware.
///
/// Fixed routes (`/reports`, `/swaps`, `/admin/...`) are registered next to the generic
/// `/{entity}` routes; the router prefers static segments, so the generic pages only see slugs
/// that no dedicated page claims. Unknown slugs are rejected by the entity registry.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/reports", get(reports::reports_page))
        .route("/settings", get(settings::show_settings).post(settings::update_settings))
        .route("/sms", get(sms::sms_page))
        .route("/sms/topup", post(sms::start_topup))
        .route("/sms/topup/verify", get(sms::verify_topup))
        .route("/swaps", get(swaps::list_swaps))
        .route("/swaps/{id}", get(swaps::show_swap))
        .route("/swaps/{id}/mark-sold", post(swaps::mark_sold))
        .route(
            "/companies/{id}/delete",
            get(companies::confirm_delete).post(companies::delete_company),
        );

    let admin_pages = Router::new()
        .route("/admin/benchmarks", get(admin::benchmarks))
        .route("/admin/reset", get(admin::reset_page).post(admin::execute_reset))
        .route("/admin/reset/preview", get(admin::reset_preview))
        .route("/admin/companies/{id}/modules", get(admin::company_modules))
        .route("/admin/companies/{id}/modules/toggle", post(admin::toggle_module))
        .route("/admin/email-logs", get(admin::email_logs));

    let entity_pages = Router::new()
        .route("/{entity}", get(entities::list_entities).post(entities::create_entity))
        .route("/{entity}/new", get(entities::new_entity))
        .route("/{entity}/{id}", get(entities::show_entity).post(entities::update_entity))
        .route("/{entity}/{id}/edit", get(entities::edit_entity))
        .route("/{entity}/{id}/delete", post(entities::delete_entity));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/static/{*path}", get(assets::serve_embedded_asset))
        .merge(pages)
        .merge(admin_pages)
        .merge(entity_pages)
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), login_redirect))
        .with_state(state);

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// The configured console, ready to serve.
///
/// 1. **Create**: [`Application::new`] builds the shop API client, compiles the templates and
///    assembles the router
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance from validated configuration
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting console with configuration: {:#?}", config);

        let api = ShopApi::new(&config.api)?;
        let views = Views::new(&config.display)?;
        let state = AppState::builder()
            .config(config.clone())
            .api(Arc::new(api))
            .views(views)
            .build();

        Ok(Self {
            router: build_router(state),
            config,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Console listening on http://{}, shop API at {}",
            bind_addr, self.config.api.base_url
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
