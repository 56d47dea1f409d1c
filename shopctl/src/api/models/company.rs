//! Company-level payloads: settings, SMS balance and the pre-delete data check.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};
use std::collections::BTreeMap;

/// `GET /api/company/settings` → `{success, settings: {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub settings: CompanySettings,
}

/// Editable company settings. Also the body of `POST /api/company/settings/update`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub currency: Option<String>,
    /// Percentage; sent as a JSON number
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[serde(deserialize_with = "serde_with::As::<DefaultOnNull>::deserialize")]
    pub tax_rate: Decimal,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub low_stock_threshold: u32,
    pub receipt_footer: Option<String>,
    pub sms_sender_id: Option<String>,
}

/// `GET /api/company/sms-balance`
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SmsBalance {
    #[serde(alias = "sms_balance")]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub balance: Decimal,
    pub sender_id: Option<String>,
    pub cost_per_sms: Option<Decimal>,
    pub last_topup_at: Option<String>,
}

/// `GET /api/companies/{id}/check-data`
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyDataCheck {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub has_data: bool,
    pub counts: BTreeMap<String, u64>,
    pub company_name: Option<String>,
}

impl CompanyDataCheck {
    /// Trust `has_data`, but also treat any non-zero count as data.
    pub fn holds_data(&self) -> bool {
        self.has_data || self.counts.values().any(|n| *n > 0)
    }
}

/// `POST /api/companies/{id}/delete` body
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDelete {
    pub force: bool,
}
