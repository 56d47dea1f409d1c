//! Device swaps: a customer trades in a device (plus cash) for a product. The received device
//! is later resold, which is recorded with mark-sold.

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

use crate::{
    AppState,
    api::models::{pagination::PageQuery, swaps::{MarkSold, Swap}},
    auth::Credentials,
    errors::{Error, Result},
    format::{currency, date},
    types::RecordId,
    views::{Banner, BannerQuery, Layout, Pager},
};

use super::{OptionView, humanize, redirect_on_error, redirect_with};

const SWAP_STATUSES: [&str; 3] = ["pending", "completed", "sold"];

#[derive(Debug, Default, Deserialize)]
pub struct SwapFilter {
    #[serde(default)]
    pub status: Option<String>,
}

impl SwapFilter {
    /// Known status or nothing; unknown values are dropped rather than forwarded.
    fn status(&self) -> Option<&'static str> {
        let wanted = self.status.as_deref()?.trim();
        SWAP_STATUSES.into_iter().find(|s| s.eq_ignore_ascii_case(wanted))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkSoldForm {
    #[serde(default)]
    pub sale_price: String,
}

#[derive(Debug, Serialize)]
struct SwapRow {
    id: String,
    customer: String,
    device: String,
    product: String,
    valuation: String,
    cash_added: String,
    total: String,
    status: String,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct SwapsPage {
    statuses: Vec<OptionView>,
    rows: Vec<SwapRow>,
    pager: Option<Pager>,
}

#[derive(Debug, Serialize)]
struct SwapDetailPage {
    id: String,
    customer: String,
    customer_phone: String,
    device: String,
    imei: String,
    condition: String,
    valuation: String,
    cash_added: String,
    total: String,
    product: String,
    status: String,
    created_at: String,
    sold: bool,
    resale_price: String,
    sold_at: String,
    sale_price: String,
}

fn text(value: &Option<String>) -> String {
    value.clone().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| "-".to_string())
}

fn status_label(swap: &Swap) -> String {
    swap.status.as_deref().map(humanize).unwrap_or_else(|| "-".to_string())
}

fn swap_row(swap: &Swap, symbol: &str) -> SwapRow {
    SwapRow {
        id: swap.id.to_string(),
        customer: text(&swap.customer_name),
        device: swap.device_label(),
        product: text(&swap.product_name),
        valuation: currency(swap.valuation, symbol),
        cash_added: currency(swap.cash_added, symbol),
        total: currency(swap.total_value(), symbol),
        status: status_label(swap),
        created_at: swap.created_at.as_deref().map(date).unwrap_or_else(|| "-".to_string()),
    }
}

fn detail_page(swap: &Swap, symbol: &str) -> SwapDetailPage {
    SwapDetailPage {
        id: swap.id.to_string(),
        customer: text(&swap.customer_name),
        customer_phone: text(&swap.customer_phone),
        device: swap.device_label(),
        imei: text(&swap.device_imei),
        condition: text(&swap.device_condition),
        valuation: currency(swap.valuation, symbol),
        cash_added: currency(swap.cash_added, symbol),
        total: currency(swap.total_value(), symbol),
        product: text(&swap.product_name),
        status: status_label(swap),
        created_at: swap.created_at.as_deref().map(date).unwrap_or_else(|| "-".to_string()),
        sold: swap.is_sold(),
        resale_price: swap.resale_price.map(|p| currency(p, symbol)).unwrap_or_else(|| "-".to_string()),
        sold_at: swap.sold_at.as_deref().map(date).unwrap_or_else(|| "-".to_string()),
        sale_price: String::new(),
    }
}

/// `GET /swaps`
#[instrument(skip_all)]
pub async fn list_swaps(
    State(state): State<AppState>,
    creds: Credentials,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<SwapFilter>,
    Query(banners): Query<BannerQuery>,
) -> Result<Html<String>> {
    let display = &state.config.display;
    let status = filter.status();
    let list = state.api.list_swaps(&creds, paging.page(), display.page_size, status).await?;

    let current = status.unwrap_or("");
    let statuses = std::iter::once(OptionView::new("", "All statuses", current))
        .chain(SWAP_STATUSES.iter().map(|s| OptionView::new(*s, humanize(s), current)))
        .collect();

    let page = SwapsPage {
        statuses,
        rows: list.items.iter().map(|s| swap_row(s, &display.currency_symbol)).collect(),
        pager: Pager::build(&list.page_info(), "/swaps", &[("status", current)]),
    };
    let layout = Layout::new("Swaps", "swaps").with_banners(banners.banners());
    state.views.render("swaps.html", &layout, page)
}

/// `GET /swaps/{id}`
#[instrument(skip_all, fields(id = %id))]
pub async fn show_swap(
    State(state): State<AppState>,
    Path(id): Path<String>,
    creds: Credentials,
    Query(banners): Query<BannerQuery>,
) -> Result<Html<String>> {
    let swap = state.api.get_swap(&creds, &RecordId::new(id)).await?;
    let page = detail_page(&swap, &state.config.display.currency_symbol);
    let layout = Layout::new(format!("Swap #{}", swap.id), "swaps").with_banners(banners.banners());
    state.views.render("swap_detail.html", &layout, page)
}

fn parse_sale_price(raw: &str) -> Result<Decimal> {
    match Decimal::from_str(raw.trim()) {
        Ok(price) if price > Decimal::ZERO => Ok(price),
        _ => Err(Error::BadRequest {
            message: "Sale price must be a positive amount.".to_string(),
        }),
    }
}

/// `POST /swaps/{id}/mark-sold`
#[instrument(skip_all, fields(id = %id))]
pub async fn mark_sold(
    State(state): State<AppState>,
    Path(id): Path<String>,
    creds: Credentials,
    Form(form): Form<MarkSoldForm>,
) -> Result<Response> {
    let id = RecordId::new(id);
    let back = format!("/swaps/{id}");

    let outcome = match parse_sale_price(&form.sale_price) {
        Ok(sale_price) => {
            let request = MarkSold {
                swap_id: id.to_json(),
                sale_price,
            };
            state.api.mark_swap_sold(&creds, &request).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(ack) => {
            let message = ack.message.unwrap_or_else(|| "Swap marked as sold.".to_string());
            Ok(redirect_with(&back, Banner::success(message)))
        }
        Err(e) => redirect_on_error(&back, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_swap_filter_status() {
        let f = SwapFilter { status: Some("SOLD".into()) };
        assert_eq!(f.status(), Some("sold"));
        let f = SwapFilter { status: Some("bogus".into()) };
        assert_eq!(f.status(), None);
        assert_eq!(SwapFilter::default().status(), None);
    }

    #[test]
    fn test_parse_sale_price() {
        assert_eq!(parse_sale_price("950.50").unwrap(), Decimal::new(95050, 2));
        assert!(parse_sale_price("0").is_err());
        assert!(parse_sale_price("-4").is_err());
        assert!(parse_sale_price("").is_err());
    }

    #[test]
    fn test_swap_row() {
        let swap: Swap = serde_json::from_value(json!({
            "id": 9,
            "customer_name": "Kwame",
            "device_brand": "Samsung",
            "device_model": "A52",
            "valuation": 800,
            "cash_added": "450.5",
            "status": "pending",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        let row = swap_row(&swap, "₵");
        assert_eq!(row.total, "₵1,250.50");
        assert_eq!(row.device, "Samsung A52");
        assert_eq!(row.product, "-");
        assert_eq!(row.status, "Pending");
        assert_eq!(row.created_at, "2024-05-01 10:00");
    }
}
