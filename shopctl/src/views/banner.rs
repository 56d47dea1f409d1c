//! Success/error banners.
//!
//! After a successful form post the handler redirects (303) to a page with `?success=<message>`
//! or `?error=<message>`; the target page turns those parameters back into banners. Failed posts
//! that re-render a form attach an error banner directly.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            message: message.into(),
        }
    }
}

impl From<&Error> for Banner {
    fn from(err: &Error) -> Self {
        Banner::error(err.user_message())
    }
}

/// `?success=` / `?error=` on the page a form post redirected to.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BannerQuery {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BannerQuery {
    pub fn banners(&self) -> Vec<Banner> {
        let mut banners = Vec::new();
        if let Some(msg) = self.success.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            banners.push(Banner::success(msg));
        }
        if let Some(msg) = self.error.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            banners.push(Banner::error(msg));
        }
        banners
    }
}

/// `path` with the banner carried as a query parameter, for post/redirect/get.
pub fn redirect_target(path: &str, banner: &Banner) -> String {
    let key = match banner.kind {
        BannerKind::Success | BannerKind::Info => "success",
        BannerKind::Error => "error",
    };
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, &banner.message)
        .finish();
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{query}")
}
