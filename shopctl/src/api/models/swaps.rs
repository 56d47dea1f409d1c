//! Device swap payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::types::RecordId;

/// A customer's used device (plus optional cash) exchanged for a shop product.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Swap {
    pub id: RecordId,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub device_brand: Option<String>,
    #[serde(default)]
    pub device_model: Option<String>,
    #[serde(default)]
    pub device_imei: Option<String>,
    #[serde(default)]
    pub device_condition: Option<String>,
    /// Value the shop credited for the customer's device
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub valuation: Decimal,
    /// Cash the customer paid on top
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub cash_added: Decimal,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub resale_price: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sold_at: Option<String>,
}

impl Swap {
    /// Total value received for the product: device credit plus cash.
    pub fn total_value(&self) -> Decimal {
        self.valuation + self.cash_added
    }

    pub fn device_label(&self) -> String {
        let parts: Vec<&str> = [self.device_brand.as_deref(), self.device_model.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if parts.is_empty() { "-".to_string() } else { parts.join(" ") }
    }

    pub fn is_sold(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("sold")) || self.sold_at.is_some()
    }
}

/// `GET /api/swaps/{id}` → `{success, swap: {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct SwapResponse {
    #[serde(alias = "item", alias = "data")]
    pub swap: Swap,
}

/// `POST /api/swaps/mark-sold` body
#[derive(Debug, Clone, Serialize)]
pub struct MarkSold {
    pub swap_id: serde_json::Value,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
}
