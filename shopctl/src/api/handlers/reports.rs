//! Report previews.
//!
//! The report page is a GET form: picking a report type and a date range and pressing Preview
//! reloads the page with `?type=&start_date=&end_date=`, and the preview table is fetched only
//! when `type` is present. Dates default to the current month so far.

use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::{
    AppState,
    api::models::reports::{REPORT_TYPES, ReportPreview},
    auth::Credentials,
    errors::{Error, Result},
    format::{ValueKind, render_value},
    views::{Banner, Layout},
};

use super::OptionView;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default, rename = "type")]
    pub report_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct ColumnView {
    label: String,
    numeric: bool,
}

#[derive(Debug, Serialize)]
struct ReportView {
    title: String,
    columns: Vec<ColumnView>,
    rows: Vec<Vec<String>>,
    totals: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ReportsPage {
    types: Vec<OptionView>,
    start_date: String,
    end_date: String,
    report: Option<ReportView>,
}

/// A validated preview request.
#[derive(Debug, PartialEq, Eq)]
struct ReportRange {
    report_type: &'static str,
    start: NaiveDate,
    end: NaiveDate,
}

fn month_to_date(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today.with_day(1).unwrap_or(today), today)
}

fn parse_date(raw: &str, label: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| Error::BadRequest {
        message: format!("{label} must be a date (YYYY-MM-DD)."),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ReportQuery {
    fn validate(&self, today: NaiveDate) -> Result<ReportRange> {
        let (default_start, default_end) = month_to_date(today);
        let wanted = non_empty(&self.report_type).unwrap_or("sales");
        let report_type = REPORT_TYPES
            .iter()
            .map(|(key, _)| *key)
            .find(|key| *key == wanted)
            .ok_or_else(|| Error::BadRequest {
                message: format!("Unknown report type '{wanted}'."),
            })?;

        let start = non_empty(&self.start_date)
            .map(|d| parse_date(d, "Start date"))
            .transpose()?
            .unwrap_or(default_start);
        let end = non_empty(&self.end_date)
            .map(|d| parse_date(d, "End date"))
            .transpose()?
            .unwrap_or(default_end);

        if start > end {
            return Err(Error::BadRequest {
                message: "Start date must be on or before the end date.".to_string(),
            });
        }
        Ok(ReportRange { report_type, start, end })
    }
}

fn report_view(preview: &ReportPreview, fallback_title: &str, symbol: &str) -> ReportView {
    let columns = preview.effective_columns();
    let cells = |record: &crate::api::models::records::Record| -> Vec<String> {
        columns
            .iter()
            .map(|c| render_value(c.kind, record.get(&c.key).unwrap_or(&Value::Null), symbol))
            .collect()
    };

    ReportView {
        title: preview.title.clone().unwrap_or_else(|| fallback_title.to_string()),
        rows: preview.rows.iter().map(&cells).collect(),
        totals: preview.totals.as_ref().map(&cells),
        columns: columns
            .iter()
            .map(|c| ColumnView {
                label: c.label(),
                numeric: matches!(c.kind, ValueKind::Money | ValueKind::Number | ValueKind::Percent),
            })
            .collect(),
    }
}

/// `GET /reports`
#[instrument(skip_all)]
pub async fn reports_page(State(state): State<AppState>, creds: Credentials, Query(query): Query<ReportQuery>) -> Result<Html<String>> {
    let today = Local::now().date_naive();
    let (default_start, default_end) = month_to_date(today);
    let requested = query.report_type.is_some();

    let mut banners = Vec::new();
    let mut report = None;
    let (current_type, start_date, end_date) = match query.validate(today) {
        Ok(range) => {
            if requested {
                let (start, end) = (range.start.to_string(), range.end.to_string());
                match state.api.report_preview(&creds, range.report_type, &start, &end).await {
                    Ok(preview) => {
                        let title = REPORT_TYPES
                            .iter()
                            .find(|(key, _)| *key == range.report_type)
                            .map(|(_, label)| format!("{label} report"))
                            .unwrap_or_default();
                        report = Some(report_view(&preview, &title, &state.config.display.currency_symbol));
                    }
                    Err(e) if e.is_unauthenticated() => return Err(e),
                    Err(e) => banners.push(Banner::from(&e)),
                }
            }
            (range.report_type.to_string(), range.start.to_string(), range.end.to_string())
        }
        Err(e) => {
            banners.push(Banner::from(&e));
            (
                non_empty(&query.report_type).unwrap_or("sales").to_string(),
                non_empty(&query.start_date).map(str::to_string).unwrap_or_else(|| default_start.to_string()),
                non_empty(&query.end_date).map(str::to_string).unwrap_or_else(|| default_end.to_string()),
            )
        }
    };

    let page = ReportsPage {
        types: REPORT_TYPES
            .iter()
            .map(|(key, label)| OptionView::new(*key, *label, &current_type))
            .collect(),
        start_date,
        end_date,
        report,
    };
    let layout = Layout::new("Reports", "reports").with_banners(banners);
    state.views.render("reports.html", &layout, page)
}
