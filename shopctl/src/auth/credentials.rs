use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
};
use tracing::{instrument, trace};

use crate::{
    AppState,
    config::AuthConfig,
    errors::{Error, Result},
};

/// Caller credentials, forwarded to the shop API on every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token, without the `Bearer ` prefix
    pub bearer: Option<String>,
    /// Upstream session cookie as a `name=value` pair
    pub session_cookie: Option<String>,
}

// Tokens must not end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Read credentials from request headers. `None` when neither a token nor a session is present.
    pub fn from_headers(headers: &HeaderMap, auth: &AuthConfig) -> Option<Self> {
        let bearer = bearer_from_header(headers).or_else(|| cookie_value(headers, &auth.token_cookie));
        let session_cookie = cookie_value(headers, &auth.session_cookie).map(|value| format!("{}={}", auth.session_cookie, value));

        if bearer.is_none() && session_cookie.is_none() {
            return None;
        }
        Some(Self { bearer, session_cookie })
    }

    /// Attach the credentials to an outgoing shop API request. A token or cookie that cannot be
    /// carried in a header is treated as no credentials at all.
    pub fn apply(&self, request: &mut reqwest::Request) -> Result<()> {
        let headers = request.headers_mut();
        if let Some(token) = &self.bearer {
            headers.insert(header::AUTHORIZATION, sensitive_value(&format!("Bearer {token}"))?);
        }
        if let Some(cookie) = &self.session_cookie {
            headers.insert(header::COOKIE, sensitive_value(cookie)?);
        }
        Ok(())
    }
}

fn sensitive_value(raw: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(raw).map_err(|_| Error::Unauthenticated {
        message: Some("Your sign-in details are invalid. Please log in again.".to_string()),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn bearer_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Value of the named cookie across all `Cookie` headers. Empty values count as absent.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

impl FromRequestParts<AppState> for Credentials {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match Credentials::from_headers(&parts.headers, &state.config.auth) {
            Some(credentials) => Ok(credentials),
            None => {
                trace!("No credentials found in request to {}", parts.uri.path());
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "token=from-cookie"),
        ]);
        let creds = Credentials::from_headers(&h, &AuthConfig::default()).unwrap();
        assert_eq!(creds.bearer.as_deref(), Some("from-header"));
    }

    #[test]
    fn test_token_and_session_cookies() {
        let h = headers(&[(header::COOKIE, "theme=dark; token=abc"), (header::COOKIE, "session=s1")]);
        let creds = Credentials::from_headers(&h, &AuthConfig::default()).unwrap();
        assert_eq!(creds.bearer.as_deref(), Some("abc"));
        assert_eq!(creds.session_cookie.as_deref(), Some("session=s1"));
    }

    #[test]
    fn test_session_only_is_enough() {
        let h = headers(&[(header::COOKIE, "session=s1")]);
        let creds = Credentials::from_headers(&h, &AuthConfig::default()).unwrap();
        assert_eq!(creds.bearer, None);
    }

    #[test]
    fn test_missing_or_empty_credentials() {
        assert!(Credentials::from_headers(&HeaderMap::new(), &AuthConfig::default()).is_none());

        let h = headers(&[(header::COOKIE, "token=; session="), (header::AUTHORIZATION, "Basic Zm9vOmJhcg==")]);
        assert!(Credentials::from_headers(&h, &AuthConfig::default()).is_none());
    }

    #[test]
    fn test_custom_cookie_names() {
        let auth = AuthConfig {
            token_cookie: "shop_jwt".to_string(),
            session_cookie: "shop_sid".to_string(),
            ..Default::default()
        };
        let h = headers(&[(header::COOKIE, "token=ignored; shop_jwt=t; shop_sid=x")]);
        let creds = Credentials::from_headers(&h, &auth).unwrap();
        assert_eq!(creds.bearer.as_deref(), Some("t"));
        assert_eq!(creds.session_cookie.as_deref(), Some("shop_sid=x"));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let creds = Credentials {
            bearer: Some("secret".to_string()),
            session_cookie: None,
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }

    fn outgoing() -> reqwest::Request {
        reqwest::Request::new(reqwest::Method::GET, "http://shop.test/api/brands".parse().unwrap())
    }

    #[test]
    fn test_apply_forwards_token_and_session() {
        let creds = Credentials {
            bearer: Some("abc".to_string()),
            session_cookie: Some("session=s1".to_string()),
        };
        let mut request = outgoing();
        creds.apply(&mut request).unwrap();

        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer abc");
        assert!(request.headers()[header::AUTHORIZATION].is_sensitive());
        assert_eq!(request.headers()[header::COOKIE], "session=s1");
    }

    #[test]
    fn test_apply_rejects_token_unfit_for_header() {
        let creds = Credentials {
            bearer: Some("abc\r\nX-Injected: 1".to_string()),
            session_cookie: None,
        };
        let err = creds.apply(&mut outgoing()).unwrap_err();
        assert!(err.is_unauthenticated());
    }
}
