//! Credential forwarding.
//!
//! The console never authenticates anyone itself: login, token issue and sessions all live
//! behind the shop API. What it does is find the caller's credentials on each incoming request
//! and pass them through on every upstream call.
//!
//! # Credential sources
//!
//! - `Authorization: Bearer <token>`, or the bearer token stored in the `auth.token_cookie`
//!   cookie when no header is sent
//! - the upstream session cookie named by `auth.session_cookie`, forwarded verbatim
//!
//! A request carrying neither is rejected with [`Error::Unauthenticated`](crate::errors::Error),
//! which [`middleware::login_redirect`] turns into a redirect to the login page. The same happens
//! when the shop API answers 401 for an expired token.
//!
//! # Modules
//!
//! - [`credentials`]: the [`Credentials`] extractor
//! - [`middleware`]: login redirect for unauthenticated responses

pub mod credentials;
pub mod middleware;

pub use credentials::Credentials;
