//! Dashboard payloads: headline counters and sales metrics for a period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

/// Reporting window for the sales metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "This week",
            Period::Month => "This month",
            Period::Year => "This year",
        }
    }

    /// Lenient parse for query strings; anything unknown falls back to the default.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("today") => Period::Today,
            Some("week") => Period::Week,
            Some("year") => Period::Year,
            _ => Period::Month,
        }
    }
}

/// `GET /api/dashboard/stats` → `{success, stats: {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub stats: DashboardStats,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub total_sales: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub total_revenue: Decimal,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub total_products: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub low_stock_count: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub pending_repairs: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub total_customers: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub active_swaps: u64,
}

/// `GET /api/dashboard/sales-metrics?period=` → `{success, metrics: {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct SalesMetricsResponse {
    #[serde(default)]
    pub metrics: SalesMetrics,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalesMetrics {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub revenue: Decimal,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub previous_revenue: Decimal,
    pub growth_percent: Option<Decimal>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub transactions: u64,
    pub average_sale: Option<Decimal>,
    pub profit: Option<Decimal>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub top_products: Vec<TopProduct>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub daily: Vec<DailyRevenue>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TopProduct {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub quantity: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub revenue: Decimal,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyRevenue {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub date: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub revenue: Decimal,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub transactions: u64,
}

impl SalesMetrics {
    /// Growth against the previous period. Uses the API's figure when present, otherwise derives
    /// it; there is no growth figure when the previous period had no revenue.
    pub fn growth(&self) -> Option<Decimal> {
        self.growth_percent.or_else(|| {
            if self.previous_revenue.is_zero() {
                None
            } else {
                Some((self.revenue - self.previous_revenue) / self.previous_revenue * Decimal::ONE_HUNDRED)
            }
        })
    }

    /// Average sale value, derived from revenue and transaction count when the API omits it.
    pub fn average(&self) -> Decimal {
        self.average_sale.unwrap_or_else(|| {
            if self.transactions == 0 {
                Decimal::ZERO
            } else {
                self.revenue / Decimal::from(self.transactions)
            }
        })
    }
}
