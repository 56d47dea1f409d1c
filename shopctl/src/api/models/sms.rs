//! Paystack SMS top-up payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `POST /api/sms/paystack/initiate` body
#[derive(Debug, Clone, Serialize)]
pub struct TopupRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub callback_url: String,
}

/// `POST /api/sms/paystack/initiate` result
#[derive(Debug, Clone, Deserialize)]
pub struct TopupSession {
    pub authorization_url: String,
    #[serde(default)]
    pub reference: Option<String>,
}

/// `GET /api/sms/paystack/verify?reference=` result
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TopupVerification {
    pub status: Option<String>,
    pub amount: Option<Decimal>,
    pub credits_added: Option<Decimal>,
    pub new_balance: Option<Decimal>,
}

impl TopupVerification {
    /// Paystack reports `success` for settled payments; anything else is still pending or failed.
    pub fn is_paid(&self) -> bool {
        matches!(self.status.as_deref(), None | Some("success") | Some("successful") | Some("paid"))
    }
}
