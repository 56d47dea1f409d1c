//! Test utilities for integration testing

use std::sync::{Arc, Once};

use axum_test::{TestRequest, TestServer};
use url::Url;

use crate::{AppState, auth::Credentials, build_router, config::Config, upstream::ShopApi, views::Views};

/// Bearer token sent by [`add_auth_headers`] and carried by [`test_credentials`].
pub const TEST_TOKEN: &str = "tok-123";

/// Session cookie sent by [`add_auth_headers`] and carried by [`test_credentials`].
pub const TEST_SESSION: &str = "session=abc";

static CRYPTO: Once = Once::new();

/// reqwest is built without a bundled crypto provider; tests install the one `main` installs.
pub fn install_crypto_provider() {
    CRYPTO.call_once(|| {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// Default configuration pointed at `base_url` (usually a wiremock server).
pub fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = Url::parse(base_url).expect("valid test base URL");
    config.api.request_timeout = std::time::Duration::from_secs(5);
    config.display.page_size = 10;
    config.payments.callback_url = "http://console.test/sms/topup/verify".to_string();
    config
}

/// Shop API client for `base_url`.
pub fn api_for(base_url: &str) -> ShopApi {
    install_crypto_provider();
    ShopApi::new(&create_test_config(base_url).api).expect("Failed to create shop API client")
}

pub fn test_credentials() -> Credentials {
    Credentials {
        bearer: Some(TEST_TOKEN.to_string()),
        session_cookie: Some(TEST_SESSION.to_string()),
    }
}

pub fn create_test_state(config: Config) -> AppState {
    install_crypto_provider();
    AppState::builder()
        .api(Arc::new(ShopApi::new(&config.api).expect("Failed to create shop API client")))
        .views(Views::new(&config.display).expect("Failed to compile templates"))
        .config(config)
        .build()
}

/// Console test server talking to the shop API at `base_url`.
pub fn create_test_app(base_url: &str) -> TestServer {
    let state = create_test_state(create_test_config(base_url));
    TestServer::new(build_router(state)).expect("Failed to create test server")
}

/// Headers that make a request authenticated: the bearer token and the upstream session cookie.
pub fn add_auth_headers() -> Vec<(String, String)> {
    vec![
        ("authorization".to_string(), format!("Bearer {TEST_TOKEN}")),
        ("cookie".to_string(), TEST_SESSION.to_string()),
    ]
}

/// Attach [`add_auth_headers`] to a request.
pub fn authed(request: TestRequest) -> TestRequest {
    add_auth_headers()
        .into_iter()
        .fold(request, |request, (name, value)| request.add_header(name, value))
}
