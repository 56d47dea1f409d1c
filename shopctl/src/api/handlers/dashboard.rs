//! The landing page: headline counters plus sales metrics for a period.

use axum::{
    extract::{Query, State},
    response::Html,
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    AppState,
    api::models::dashboard::{DashboardStats, Period, SalesMetrics},
    auth::Credentials,
    errors::Result,
    format::{currency, date, number, percent},
    views::{BannerQuery, Layout},
};

use super::OptionView;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatCard {
    label: &'static str,
    value: String,
    /// Highlight the card (something needs attention)
    alert: bool,
}

#[derive(Debug, Serialize)]
struct TopProductRow {
    name: String,
    quantity: String,
    revenue: String,
}

#[derive(Debug, Serialize)]
struct DailyRow {
    date: String,
    transactions: String,
    revenue: String,
    /// Bar length relative to the best day, 0-100
    bar_percent: u32,
}

#[derive(Debug, Serialize)]
struct DashboardPage {
    periods: Vec<OptionView>,
    revenue: String,
    growth: String,
    growth_class: &'static str,
    transactions: String,
    average_sale: String,
    profit: Option<String>,
    stats: Vec<StatCard>,
    top_products: Vec<TopProductRow>,
    daily: Vec<DailyRow>,
}

/// `GET /` - stats and sales metrics are fetched concurrently.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    creds: Credentials,
    Query(query): Query<DashboardQuery>,
    Query(banners): Query<BannerQuery>,
) -> Result<Html<String>> {
    let period = Period::parse(query.period.as_deref());

    let (stats, metrics) = tokio::try_join!(state.api.dashboard_stats(&creds), state.api.sales_metrics(&creds, period))?;

    let page = build_page(&stats, &metrics, period, &state.config.display.currency_symbol);
    let layout = Layout::new("Dashboard", "dashboard").with_banners(banners.banners());
    state.views.render("dashboard.html", &layout, page)
}

fn build_page(stats: &DashboardStats, metrics: &SalesMetrics, period: Period, symbol: &str) -> DashboardPage {
    let growth = metrics.growth();
    let best_day = metrics.daily.iter().map(|d| d.revenue).max().unwrap_or(Decimal::ZERO);

    DashboardPage {
        periods: Period::ALL
            .iter()
            .map(|p| OptionView::new(p.as_str(), p.label(), period.as_str()))
            .collect(),
        revenue: currency(metrics.revenue, symbol),
        growth: growth.map(signed_percent).unwrap_or_else(|| "-".to_string()),
        growth_class: match growth {
            Some(g) if g.is_sign_positive() && !g.is_zero() => "up",
            Some(g) if g.is_sign_negative() && !g.is_zero() => "down",
            _ => "",
        },
        transactions: number(Decimal::from(metrics.transactions)),
        average_sale: currency(metrics.average(), symbol),
        profit: metrics.profit.map(|p| currency(p, symbol)),
        stats: vec![
            StatCard {
                label: "Total sales",
                value: number(Decimal::from(stats.total_sales)),
                alert: false,
            },
            StatCard {
                label: "Total revenue",
                value: currency(stats.total_revenue, symbol),
                alert: false,
            },
            StatCard {
                label: "Products",
                value: number(Decimal::from(stats.total_products)),
                alert: false,
            },
            StatCard {
                label: "Low stock",
                value: number(Decimal::from(stats.low_stock_count)),
                alert: stats.low_stock_count > 0,
            },
            StatCard {
                label: "Pending repairs",
                value: number(Decimal::from(stats.pending_repairs)),
                alert: stats.pending_repairs > 0,
            },
            StatCard {
                label: "Customers",
                value: number(Decimal::from(stats.total_customers)),
                alert: false,
            },
            StatCard {
                label: "Active swaps",
                value: number(Decimal::from(stats.active_swaps)),
                alert: false,
            },
        ],
        top_products: metrics
            .top_products
            .iter()
            .map(|p| TopProductRow {
                name: p.name.clone(),
                quantity: number(Decimal::from(p.quantity)),
                revenue: currency(p.revenue, symbol),
            })
            .collect(),
        daily: metrics
            .daily
            .iter()
            .map(|d| DailyRow {
                date: date(&d.date),
                transactions: number(Decimal::from(d.transactions)),
                revenue: currency(d.revenue, symbol),
                bar_percent: bar_percent(d.revenue, best_day),
            })
            .collect(),
    }
}

/// `+12.50%` / `-3.00%`
fn signed_percent(value: Decimal) -> String {
    let text = percent(value);
    if text.starts_with('-') || text == "0.00%" { text } else { format!("+{text}") }
}

fn bar_percent(value: Decimal, best: Decimal) -> u32 {
    if best <= Decimal::ZERO || value <= Decimal::ZERO {
        return 0;
    }
    let ratio = (value / best * Decimal::ONE_HUNDRED).round();
    ratio.to_u32().unwrap_or(100).min(100)
}
