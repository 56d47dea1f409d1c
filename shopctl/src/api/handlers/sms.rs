//! SMS balance and Paystack top-ups.
//!
//! A top-up is a three-leg flow: `POST /sms/topup` asks the shop API to open a Paystack checkout
//! and sends the browser to its `authorization_url`; Paystack sends the customer back to
//! `payments.callback_url` (normally `/sms/topup/verify`) with `reference`/`trxref`, which is
//! verified with the shop API before credits are reported.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    AppState,
    api::models::{company::SmsBalance, sms::TopupRequest},
    auth::Credentials,
    errors::{Error, Result},
    format::{currency, date, number},
    views::{Banner, BannerQuery, Layout},
};

use super::{redirect_on_error, redirect_with};

#[derive(Debug, Default, Deserialize)]
pub struct TopupForm {
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub trxref: Option<String>,
}

impl VerifyQuery {
    /// Paystack sends both; either will do.
    fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .or(self.trxref.as_deref())
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct SmsPage {
    balance: String,
    sender_id: String,
    cost_per_sms: Option<String>,
    last_topup_at: String,
    currency_symbol: String,
    amount: String,
    min_topup: String,
    min_topup_display: String,
}

fn parse_amount(raw: &str, min: Decimal, symbol: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(raw.trim()).map_err(|_| Error::BadRequest {
        message: "Enter the amount to top up.".to_string(),
    })?;
    if amount < min {
        return Err(Error::BadRequest {
            message: format!("The minimum top-up is {}.", currency(min, symbol)),
        });
    }
    Ok(amount)
}

/// Paystack checkout links are absolute http(s) URLs; anything else is not followed.
fn checkout_url(raw: &str) -> Result<Url> {
    Url::parse(raw)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| Error::Api {
            message: "The payment provider returned an invalid checkout link.".to_string(),
        })
}

fn render(state: &AppState, balance: &SmsBalance, amount: &str, banners: Vec<Banner>, status: StatusCode) -> Result<Response> {
    let display = &state.config.display;
    let min = state.config.payments.min_topup;
    let page = SmsPage {
        balance: number(balance.balance),
        sender_id: balance.sender_id.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "-".to_string()),
        cost_per_sms: balance.cost_per_sms.map(|c| currency(c, &display.currency_symbol)),
        last_topup_at: balance.last_topup_at.as_deref().map(date).unwrap_or_else(|| "-".to_string()),
        currency_symbol: display.currency_symbol.clone(),
        amount: amount.to_string(),
        min_topup: min.normalize().to_string(),
        min_topup_display: currency(min, &display.currency_symbol),
    };
    let layout = Layout::new("SMS credits", "sms").with_banners(banners);
    let html = state.views.render("sms.html", &layout, page)?;
    Ok((status, html).into_response())
}

/// `GET /sms`
#[instrument(skip_all)]
pub async fn sms_page(State(state): State<AppState>, creds: Credentials, Query(banners): Query<BannerQuery>) -> Result<Response> {
    let balance = state.api.sms_balance(&creds).await?;
    render(&state, &balance, "", banners.banners(), StatusCode::OK)
}

/// `POST /sms/topup`
#[instrument(skip_all)]
pub async fn start_topup(State(state): State<AppState>, creds: Credentials, Form(form): Form<TopupForm>) -> Result<Response> {
    let payments = &state.config.payments;
    let amount = match parse_amount(&form.amount, payments.min_topup, &state.config.display.currency_symbol) {
        Ok(amount) => amount,
        Err(e) => {
            let balance = state.api.sms_balance(&creds).await?;
            return render(&state, &balance, &form.amount, vec![Banner::from(&e)], e.status_code());
        }
    };

    let request = TopupRequest {
        amount,
        callback_url: payments.callback_url.clone(),
    };
    let session = match state.api.initiate_topup(&creds, &request).await.and_then(|s| {
        let url = checkout_url(&s.authorization_url)?;
        Ok((url, s.reference))
    }) {
        Ok(session) => session,
        Err(e) => return redirect_on_error("/sms", e),
    };

    info!(reference = ?session.1, %amount, "Redirecting to Paystack checkout");
    Ok(Redirect::to(session.0.as_str()).into_response())
}

/// `GET /sms/topup/verify`
#[instrument(skip_all)]
pub async fn verify_topup(State(state): State<AppState>, creds: Credentials, Query(query): Query<VerifyQuery>) -> Result<Response> {
    let Some(reference) = query.reference() else {
        return Ok(redirect_with("/sms", Banner::error("Missing payment reference.")));
    };

    let verification = match state.api.verify_topup(&creds, reference).await {
        Ok(v) => v,
        Err(e) => return redirect_on_error("/sms", e),
    };

    if !verification.is_paid() {
        warn!(reference, status = ?verification.status, "Top-up not paid");
        let status = verification.status.as_deref().unwrap_or("unknown");
        return Ok(redirect_with(
            "/sms",
            Banner::error(format!("Payment was not completed (status: {status}).")),
        ));
    }

    let mut message = "Payment successful.".to_string();
    if let Some(credits) = verification.credits_added {
        message.push_str(&format!(" {} SMS credits added.", number(credits)));
    }
    if let Some(balance) = verification.new_balance {
        message.push_str(&format!(" New balance: {}.", number(balance)));
    }
    info!(reference, "Top-up verified");
    Ok(redirect_with("/sms", Banner::success(message)))
}
