//! Super-admin pages: performance benchmarks, company data reset, per-company module
//! switches, and the outbound email log.

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    AppState,
    api::models::{
        admin::{Benchmark, BenchmarkStatus, CompanyModule, EmailLog, ModuleToggle, ResetPreview, ResetRequest, ResetScope},
        pagination::PageQuery,
        records::{record_id, record_text},
    },
    auth::Credentials,
    errors::{Error, Result},
    format::{date, number},
    types::RecordId,
    views::{Banner, BannerQuery, Layout, Pager},
};

use super::{OptionView, humanize, redirect_on_error, redirect_with};

/// Word that must be typed to confirm a reset.
const RESET_CONFIRMATION: &str = "RESET";

const EMAIL_STATUSES: [&str; 3] = ["sent", "failed", "pending"];

/// Companies offered in the reset selector.
const COMPANY_LIMIT: u32 = 100;

// Benchmarks

#[derive(Debug, Serialize)]
struct BenchmarkRow {
    name: String,
    duration: String,
    threshold: String,
    status: BenchmarkStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct BenchmarksPage {
    generated_at: Option<String>,
    rows: Vec<BenchmarkRow>,
}

fn milliseconds(value: rust_decimal::Decimal) -> String {
    format!("{} ms", number(value))
}

fn benchmark_row(b: &Benchmark) -> BenchmarkRow {
    BenchmarkRow {
        name: b.name.clone(),
        duration: milliseconds(b.duration_ms),
        threshold: b.threshold_ms.map(milliseconds).unwrap_or_else(|| "-".to_string()),
        status: b.status(),
        details: b.details.clone().unwrap_or_default(),
    }
}

/// `GET /admin/benchmarks`
#[instrument(skip_all)]
pub async fn benchmarks(State(state): State<AppState>, creds: Credentials) -> Result<Html<String>> {
    let response = state.api.benchmarks(&creds).await?;
    let page = BenchmarksPage {
        generated_at: response.generated_at.as_deref().map(date),
        rows: response.benchmarks.iter().map(benchmark_row).collect(),
    };
    state.views.render("benchmarks.html", &Layout::new("Benchmarks", "benchmarks"), page)
}

// Data reset

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetForm {
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub confirm: String,
}

#[derive(Debug, Serialize)]
struct CountRow {
    label: String,
    count: String,
}

#[derive(Debug, Serialize)]
struct PreviewView {
    company_name: String,
    company_id: String,
    scope: &'static str,
    scope_label: &'static str,
    counts: Vec<CountRow>,
    total: String,
}

#[derive(Debug, Serialize)]
struct ResetPage {
    companies: Vec<OptionView>,
    scopes: Vec<OptionView>,
    preview: Option<PreviewView>,
}

fn parse_scope(raw: Option<&str>) -> Result<ResetScope> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(ResetScope::default()),
        Some(raw) => ResetScope::parse(raw).ok_or_else(|| Error::BadRequest {
            message: format!("Unknown reset scope '{raw}'."),
        }),
    }
}

fn preview_view(preview: &ResetPreview, company_id: &RecordId, fallback_name: &str, scope: ResetScope) -> PreviewView {
    PreviewView {
        company_name: preview
            .company_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| fallback_name.to_string()),
        company_id: company_id.to_string(),
        scope: scope.as_str(),
        scope_label: scope.label(),
        counts: preview
            .counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(key, n)| CountRow {
                label: humanize(key),
                count: number((*n).into()),
            })
            .collect(),
        total: number(preview.total().into()),
    }
}

async fn render_reset(
    state: &AppState,
    creds: &Credentials,
    company_id: Option<&RecordId>,
    scope: ResetScope,
    banners: Vec<Banner>,
) -> Result<Html<String>> {
    let mut banners = banners;
    let companies = state.api.list_records(creds, "api/companies", 1, COMPANY_LIMIT, None).await?;
    let current = company_id.map(RecordId::as_str).unwrap_or("");

    let mut preview = None;
    if let Some(id) = company_id {
        let name = companies
            .items
            .iter()
            .find(|c| record_id(c).as_ref() == Some(id))
            .map(|c| record_text(c, "name"))
            .unwrap_or_else(|| format!("Company {id}"));
        match state.api.reset_preview(creds, id, scope).await {
            Ok(p) => preview = Some(preview_view(&p, id, &name, scope)),
            Err(e) if e.is_unauthenticated() => return Err(e),
            Err(e) => banners.push(Banner::from(&e)),
        }
    }

    let page = ResetPage {
        companies: companies
            .items
            .iter()
            .filter_map(|c| record_id(c).map(|id| OptionView::new(id.to_string(), record_text(c, "name"), current)))
            .collect(),
        scopes: ResetScope::ALL
            .iter()
            .map(|s| OptionView::new(s.as_str(), s.label(), scope.as_str()))
            .collect(),
        preview,
    };
    let layout = Layout::new("Data reset", "reset").with_banners(banners);
    state.views.render("reset.html", &layout, page)
}

/// `GET /admin/reset`
#[instrument(skip_all)]
pub async fn reset_page(State(state): State<AppState>, creds: Credentials, Query(banners): Query<BannerQuery>) -> Result<Html<String>> {
    render_reset(&state, &creds, None, ResetScope::default(), banners.banners()).await
}

/// `GET /admin/reset/preview`
#[instrument(skip_all)]
pub async fn reset_preview(State(state): State<AppState>, creds: Credentials, Query(query): Query<ResetQuery>) -> Result<Html<String>> {
    let scope = match parse_scope(query.scope.as_deref()) {
        Ok(scope) => scope,
        Err(e) => return render_reset(&state, &creds, None, ResetScope::default(), vec![Banner::from(&e)]).await,
    };
    let company_id = query
        .company_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(RecordId::new);

    let banners = if company_id.is_none() {
        vec![Banner::error("Select a company to preview.")]
    } else {
        Vec::new()
    };
    render_reset(&state, &creds, company_id.as_ref(), scope, banners).await
}

/// `POST /admin/reset`
#[instrument(skip_all)]
pub async fn execute_reset(State(state): State<AppState>, creds: Credentials, Form(form): Form<ResetForm>) -> Result<Response> {
    let company_id = form.company_id.trim();
    if company_id.is_empty() {
        return Ok(redirect_with("/admin/reset", Banner::error("Select a company to reset.")));
    }
    let company_id = RecordId::new(company_id);
    let scope = match parse_scope(Some(&form.scope)) {
        Ok(scope) => scope,
        Err(e) => return redirect_on_error("/admin/reset", e),
    };
    let back = format!("/admin/reset/preview?company_id={}&scope={}", encode(company_id.as_str()), scope.as_str());

    if form.confirm.trim() != RESET_CONFIRMATION {
        return Ok(redirect_with(
            &back,
            Banner::error(format!("Type {RESET_CONFIRMATION} to confirm the reset.")),
        ));
    }

    let request = ResetRequest {
        company_id: company_id.to_json(),
        scope,
    };
    match state.api.reset_execute(&creds, &request).await {
        Ok(result) => {
            let removed: u64 = result.deleted.values().sum();
            warn!(company = %company_id, scope = scope.as_str(), removed, "Company data reset");
            let message = result
                .message
                .unwrap_or_else(|| format!("Reset complete. {} records removed.", number(removed.into())));
            Ok(redirect_with("/admin/reset", Banner::success(message)))
        }
        Err(e) => redirect_on_error(&back, e),
    }
}

fn encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

// Company modules

#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub enabled: String,
}

#[derive(Debug, Serialize)]
struct ModuleRow {
    key: String,
    name: String,
    description: String,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct ModulesPage {
    company_id: String,
    modules: Vec<ModuleRow>,
}

fn module_row(m: &CompanyModule) -> ModuleRow {
    ModuleRow {
        key: m.key.clone(),
        name: m.display_name(),
        description: m.description.clone().unwrap_or_default(),
        enabled: m.enabled,
    }
}

/// `GET /admin/companies/{id}/modules`
#[instrument(skip_all, fields(company = %id))]
pub async fn company_modules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    creds: Credentials,
    Query(banners): Query<BannerQuery>,
) -> Result<Html<String>> {
    let id = RecordId::new(id);
    let response = state.api.company_modules(&creds, &id).await?;
    let title = match response.company.as_ref().filter(|c| !c.name.is_empty()) {
        Some(company) => format!("Modules: {}", company.name),
        None => "Modules".to_string(),
    };
    let page = ModulesPage {
        company_id: id.to_string(),
        modules: response.modules.iter().map(module_row).collect(),
    };
    let layout = Layout::new(title, "companies").with_banners(banners.banners());
    state.views.render("modules.html", &layout, page)
}

/// `POST /admin/companies/{id}/modules/toggle`
#[instrument(skip_all, fields(company = %id))]
pub async fn toggle_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
    creds: Credentials,
    Form(form): Form<ToggleForm>,
) -> Result<Response> {
    let id = RecordId::new(id);
    let back = format!("/admin/companies/{id}/modules");

    let module = form.module.trim();
    let enabled = match form.enabled.trim() {
        "true" | "1" | "on" => true,
        "false" | "0" | "off" => false,
        _ => return Ok(redirect_with(&back, Banner::error("Invalid module state."))),
    };
    if module.is_empty() {
        return Ok(redirect_with(&back, Banner::error("No module selected.")));
    }

    let toggle = ModuleToggle {
        module: module.to_string(),
        enabled,
    };
    match state.api.toggle_module(&creds, &id, &toggle).await {
        Ok(ack) => {
            info!(module, enabled, "Module toggled");
            let verb = if enabled { "enabled" } else { "disabled" };
            let message = ack.message.unwrap_or_else(|| format!("Module {} {verb}.", humanize(module)));
            Ok(redirect_with(&back, Banner::success(message)))
        }
        Err(e) => redirect_on_error(&back, e),
    }
}

// Email logs

#[derive(Debug, Default, Deserialize)]
pub struct EmailLogFilter {
    #[serde(default)]
    pub status: Option<String>,
}

impl EmailLogFilter {
    fn status(&self) -> Option<&'static str> {
        let wanted = self.status.as_deref()?.trim();
        EMAIL_STATUSES.into_iter().find(|s| s.eq_ignore_ascii_case(wanted))
    }
}

#[derive(Debug, Serialize)]
struct EmailLogRow {
    sent_at: String,
    recipient: String,
    subject: String,
    status: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct EmailLogsPage {
    statuses: Vec<OptionView>,
    rows: Vec<EmailLogRow>,
    pager: Option<Pager>,
}

fn email_row(log: &EmailLog) -> EmailLogRow {
    EmailLogRow {
        sent_at: log.sent_at.as_deref().map(date).unwrap_or_else(|| "-".to_string()),
        recipient: log.recipient.clone(),
        subject: log.subject.clone(),
        status: if log.status.is_empty() { "-".to_string() } else { humanize(&log.status) },
        error: log.error.clone().unwrap_or_default(),
    }
}

/// `GET /admin/email-logs`
#[instrument(skip_all)]
pub async fn email_logs(
    State(state): State<AppState>,
    creds: Credentials,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<EmailLogFilter>,
) -> Result<Html<String>> {
    let status = filter.status();
    let list = state
        .api
        .email_logs(&creds, paging.page(), state.config.display.page_size, status)
        .await?;

    let current = status.unwrap_or("");
    let page = EmailLogsPage {
        statuses: std::iter::once(OptionView::new("", "All statuses", current))
            .chain(EMAIL_STATUSES.iter().map(|s| OptionView::new(*s, humanize(s), current)))
            .collect(),
        rows: list.items.iter().map(email_row).collect(),
        pager: Pager::build(&list.page_info(), "/admin/email-logs", &[("status", current)]),
    };
    state.views.render("email_logs.html", &Layout::new("Email logs", "email-logs"), page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_benchmark_row() {
        let b: Benchmark = serde_json::from_value(json!({
            "name": "Product search",
            "duration_ms": 1450.5,
            "threshold_ms": 500
        }))
        .unwrap();
        let row = benchmark_row(&b);
        assert_eq!(row.duration, "1,450.5 ms");
        assert_eq!(row.threshold, "500 ms");
        assert_eq!(row.status, BenchmarkStatus::Fail);
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope(None).unwrap(), ResetScope::Transactions);
        assert_eq!(parse_scope(Some("")).unwrap(), ResetScope::Transactions);
        assert_eq!(parse_scope(Some("inventory")).unwrap(), ResetScope::Inventory);
        assert!(parse_scope(Some("users")).is_err());
    }

    #[test]
    fn test_preview_view_hides_empty_counts() {
        let preview: ResetPreview = serde_json::from_value(json!({
            "counts": {"sales": 1200, "repairs": 0, "swap_items": 3}
        }))
        .unwrap();
        let view = preview_view(&preview, &RecordId::new("7"), "Ama Phones", ResetScope::All);
        assert_eq!(view.company_name, "Ama Phones");
        assert_eq!(view.total, "1,203");
        let labels: Vec<&str> = view.counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Sales", "Swap items"]);
        assert_eq!(view.scope, "all");
    }

    #[test]
    fn test_email_filter_and_row() {
        assert_eq!(EmailLogFilter { status: Some("Failed".into()) }.status(), Some("failed"));
        assert_eq!(EmailLogFilter { status: Some("x".into()) }.status(), None);

        let log: EmailLog = serde_json::from_value(json!({
            "to": "ama@example.com",
            "subject": "Receipt",
            "status": "failed",
            "created_at": "2024-02-01 09:30:00",
            "error": "mailbox full"
        }))
        .unwrap();
        let row = email_row(&log);
        assert_eq!(row.recipient, "ama@example.com");
        assert_eq!(row.sent_at, "2024-02-01 09:30");
        assert_eq!(row.status, "Failed");
    }
}
