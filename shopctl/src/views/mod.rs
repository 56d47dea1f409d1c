//! Server-side rendering.
//!
//! Templates live in `templates/` and are compiled into the binary. Every page extends
//! `layout.html`, which renders the navigation, the page title and any [`Banner`]s. Handlers
//! pass a [`Layout`] plus a page-specific context; values are formatted in Rust (see
//! [`crate::format`]) before they reach a template, so templates only place strings.
//!
//! Autoescaping is on for every `.html` template.

pub mod banner;
pub mod entities;
pub mod pager;

use axum::response::Html;
use minijinja::{Environment, HtmlEscape, Value, context};
use serde::Serialize;
use std::sync::{Arc, LazyLock};

use crate::{config::DisplayConfig, errors::Result};

pub use banner::{Banner, BannerQuery};
pub use pager::Pager;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("pager.html", include_str!("../../templates/pager.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("entity_list.html", include_str!("../../templates/entity_list.html")),
    ("entity_form.html", include_str!("../../templates/entity_form.html")),
    ("entity_detail.html", include_str!("../../templates/entity_detail.html")),
    ("company_delete.html", include_str!("../../templates/company_delete.html")),
    ("settings.html", include_str!("../../templates/settings.html")),
    ("sms.html", include_str!("../../templates/sms.html")),
    ("reports.html", include_str!("../../templates/reports.html")),
    ("swaps.html", include_str!("../../templates/swaps.html")),
    ("swap_detail.html", include_str!("../../templates/swap_detail.html")),
    ("benchmarks.html", include_str!("../../templates/benchmarks.html")),
    ("reset.html", include_str!("../../templates/reset.html")),
    ("modules.html", include_str!("../../templates/modules.html")),
    ("email_logs.html", include_str!("../../templates/email_logs.html")),
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NavLink {
    pub key: &'static str,
    pub href: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NavGroup {
    pub label: &'static str,
    pub links: &'static [NavLink],
}

const fn link(key: &'static str, href: &'static str, label: &'static str) -> NavLink {
    NavLink { key, href, label }
}

pub const NAVIGATION: &[NavGroup] = &[
    NavGroup {
        label: "Overview",
        links: &[link("dashboard", "/", "Dashboard"), link("reports", "/reports", "Reports")],
    },
    NavGroup {
        label: "Catalogue",
        links: &[
            link("brands", "/brands", "Brands"),
            link("categories", "/categories", "Categories"),
            link("subcategories", "/subcategories", "Subcategories"),
        ],
    },
    NavGroup {
        label: "Operations",
        links: &[
            link("suppliers", "/suppliers", "Suppliers"),
            link("purchase-orders", "/purchase-orders", "Purchase Orders"),
            link("swaps", "/swaps", "Swaps"),
            link("staff", "/staff", "Staff"),
        ],
    },
    NavGroup {
        label: "Company",
        links: &[link("settings", "/settings", "Settings"), link("sms", "/sms", "SMS Credits")],
    },
    NavGroup {
        label: "Administration",
        links: &[
            link("companies", "/companies", "Companies"),
            link("users", "/users", "Users"),
            link("benchmarks", "/admin/benchmarks", "Benchmarks"),
            link("reset", "/admin/reset", "Data Reset"),
            link("email-logs", "/admin/email-logs", "Email Logs"),
        ],
    },
];

/// Page chrome shared by every template.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: String,
    /// Navigation key of the highlighted link
    pub active: &'static str,
    pub banners: Vec<Banner>,
}

impl Layout {
    pub fn new(title: impl Into<String>, active: &'static str) -> Self {
        Self {
            title: title.into(),
            active,
            banners: Vec::new(),
        }
    }

    pub fn with_banners(mut self, banners: impl IntoIterator<Item = Banner>) -> Self {
        self.banners.extend(banners);
        self
    }

    pub fn with_banner(mut self, banner: Banner) -> Self {
        self.banners.push(banner);
        self
    }
}

/// The compiled template environment. Cheap to clone.
#[derive(Clone)]
pub struct Views {
    env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new(display: &DisplayConfig) -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_global("app_name", Value::from(display.app_name.clone()));
        env.add_global("navigation", Value::from_serialize(NAVIGATION));
        Ok(Self { env: Arc::new(env) })
    }

    /// Render `template` with the layout under `layout` and the page context under `page`.
    pub fn render<S: Serialize>(&self, template: &str, layout: &Layout, page: S) -> Result<Html<String>> {
        let tmpl = self.env.get_template(template)?;
        let body = tmpl.render(context! { layout => layout, page => page })?;
        Ok(Html(body))
    }
}

static ERROR_PAGE: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    if let Err(e) = env.add_template("error.html", include_str!("../../templates/error.html")) {
        tracing::error!("Failed to compile error template: {e}");
    }
    env
});

/// Standalone error page, rendered without the application state.
pub fn render_error_page(message: &str) -> String {
    ERROR_PAGE
        .get_template("error.html")
        .and_then(|tmpl| tmpl.render(context! { message => message }))
        .unwrap_or_else(|e| {
            tracing::error!("Failed to render error page: {e}");
            format!("<!DOCTYPE html><p>{}</p>", HtmlEscape(message))
        })
}
