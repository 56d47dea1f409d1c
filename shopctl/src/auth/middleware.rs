use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::{AppState, errors::LoginRequired};

/// Send unauthenticated callers to the login page.
///
/// Any 401 produced by [`Error::Unauthenticated`](crate::errors::Error) (missing credentials, or
/// the shop API rejecting an expired token) becomes a `303 See Other` to
/// `auth.login_url?next=<path and query>`, so the user lands back on the same page after logging in.
pub async fn login_redirect(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let response = next.run(request).await;

    if response.status() == StatusCode::UNAUTHORIZED && response.extensions().get::<LoginRequired>().is_some() {
        let location = login_location(&state.config.auth.login_url, &original);
        debug!("Redirecting unauthenticated request for {} to {}", original, location);
        return Redirect::to(&location).into_response();
    }

    response
}

/// `login_url` with `next` appended as a query parameter.
pub fn login_location(login_url: &str, next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{login_url}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_location() {
        assert_eq!(login_location("/login", "/brands?page=2"), "/login?next=%2Fbrands%3Fpage%3D2");
        assert_eq!(
            login_location("https://shop.example/auth?app=desk", "/"),
            "https://shop.example/auth?app=desk&next=%2F"
        );
    }
}
