//! HTTP handlers for every console page.
//!
//! Each handler extracts the caller's [`Credentials`](crate::auth::Credentials), calls the shop
//! API through [`ShopApi`](crate::upstream::ShopApi), and renders a template.
//!
//! Form posts follow post/redirect/get: on success the handler answers `303 See Other` with a
//! `?success=` banner; when validation or the shop API rejects the input the form is rendered
//! again with the submitted values and an error banner. An expired token always ends in the
//! login redirect instead.
//!
//! # Handler Modules
//!
//! - [`admin`]: benchmarks, data reset, company modules, email logs
//! - [`companies`]: company deletion with the data check
//! - [`dashboard`]: the landing page
//! - [`entities`]: generic CRUD pages
//! - [`reports`]: report previews
//! - [`settings`]: company settings
//! - [`sms`]: SMS balance and Paystack top-ups
//! - [`static_assets`]: embedded CSS
//! - [`swaps`]: device swaps

pub mod admin;
pub mod companies;
pub mod dashboard;
pub mod entities;
pub mod reports;
pub mod settings;
pub mod sms;
pub mod static_assets;
pub mod swaps;

use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

use crate::{
    errors::{Error, Result},
    views::{Banner, banner::redirect_target},
};

/// `303 See Other` to `path` carrying a banner.
pub(crate) fn redirect_with(path: &str, banner: Banner) -> Response {
    Redirect::to(&redirect_target(path, &banner)).into_response()
}

/// Redirect back with the error as a banner, unless it must end in the login redirect.
pub(crate) fn redirect_on_error(path: &str, err: Error) -> Result<Response> {
    if err.is_unauthenticated() {
        return Err(err);
    }
    Ok(redirect_with(path, Banner::from(&err)))
}

/// An `<option>` of a filter or selection list.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value == current;
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

/// `sales_count` → `Sales count`
pub(crate) fn humanize(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
