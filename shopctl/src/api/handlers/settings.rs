//! Company settings page.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

use crate::{
    AppState,
    api::models::company::CompanySettings,
    auth::Credentials,
    errors::{Error, Result},
    views::{Banner, BannerQuery, Layout, entities::is_email},
};

use super::redirect_with;

/// Longest alphanumeric sender id SMS networks accept.
const SENDER_ID_MAX_LEN: usize = 11;

/// The settings form, both as submitted and as rendered.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub currency: String,
    pub tax_rate: String,
    pub low_stock_threshold: String,
    pub receipt_footer: String,
    pub sms_sender_id: String,
}

impl From<CompanySettings> for SettingsForm {
    fn from(s: CompanySettings) -> Self {
        Self {
            name: s.name,
            email: s.email.unwrap_or_default(),
            phone: s.phone.unwrap_or_default(),
            address: s.address.unwrap_or_default(),
            currency: s.currency.unwrap_or_default(),
            tax_rate: s.tax_rate.normalize().to_string(),
            low_stock_threshold: s.low_stock_threshold.to_string(),
            receipt_footer: s.receipt_footer.unwrap_or_default(),
            sms_sender_id: s.sms_sender_id.unwrap_or_default(),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl SettingsForm {
    /// Validate the form into the settings body. All problems are reported together.
    pub fn to_settings(&self) -> Result<CompanySettings> {
        let mut problems = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            problems.push("Business name is required.".to_string());
        }

        let email = optional(&self.email);
        if email.as_deref().is_some_and(|e| !is_email(e)) {
            problems.push("Email must be a valid email address.".to_string());
        }

        let tax_rate = match self.tax_rate.trim() {
            "" => Decimal::ZERO,
            raw => match Decimal::from_str(raw) {
                Ok(rate) if rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED => rate,
                _ => {
                    problems.push("Tax rate must be a percentage between 0 and 100.".to_string());
                    Decimal::ZERO
                }
            },
        };

        let low_stock_threshold = match self.low_stock_threshold.trim() {
            "" => 0,
            raw => raw.parse::<u32>().unwrap_or_else(|_| {
                problems.push("Low stock threshold must be a whole number.".to_string());
                0
            }),
        };

        let sms_sender_id = optional(&self.sms_sender_id);
        if let Some(sender) = &sms_sender_id
            && (sender.chars().count() > SENDER_ID_MAX_LEN || !sender.chars().all(|c| c.is_ascii_alphanumeric() || c == ' '))
        {
            problems.push(format!("SMS sender ID must be at most {SENDER_ID_MAX_LEN} letters or digits."));
        }

        if !problems.is_empty() {
            return Err(Error::BadRequest {
                message: problems.join(" "),
            });
        }

        Ok(CompanySettings {
            name: name.to_string(),
            email,
            phone: optional(&self.phone),
            address: optional(&self.address),
            currency: optional(&self.currency).map(|c| c.to_uppercase()),
            tax_rate,
            low_stock_threshold,
            receipt_footer: optional(&self.receipt_footer),
            sms_sender_id,
        })
    }
}

fn render(state: &AppState, form: &SettingsForm, banners: Vec<Banner>, status: StatusCode) -> Result<Response> {
    let layout = Layout::new("Company settings", "settings").with_banners(banners);
    let html = state.views.render("settings.html", &layout, form)?;
    Ok((status, html).into_response())
}

/// `GET /settings`
#[instrument(skip_all)]
pub async fn show_settings(State(state): State<AppState>, creds: Credentials, Query(banners): Query<BannerQuery>) -> Result<Response> {
    let settings = state.api.company_settings(&creds).await?;
    render(&state, &SettingsForm::from(settings), banners.banners(), StatusCode::OK)
}

/// `POST /settings`
#[instrument(skip_all)]
pub async fn update_settings(State(state): State<AppState>, creds: Credentials, Form(form): Form<SettingsForm>) -> Result<Response> {
    let outcome = match form.to_settings() {
        Ok(settings) => state.api.update_company_settings(&creds, &settings).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(_) => Ok(redirect_with("/settings", Banner::success("Settings saved."))),
        Err(e) if e.is_unauthenticated() => Err(e),
        Err(e) => render(&state, &form, vec![Banner::from(&e)], e.status_code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SettingsForm {
        SettingsForm {
            name: "Ama Phones".to_string(),
            tax_rate: "12.5".to_string(),
            low_stock_threshold: "5".to_string(),
            currency: "ghs".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_settings() {
        let settings = form().to_settings().unwrap();
        assert_eq!(settings.tax_rate, Decimal::new(125, 1));
        assert_eq!(settings.low_stock_threshold, 5);
        assert_eq!(settings.currency.as_deref(), Some("GHS"));
        assert_eq!(settings.email, None);
    }

    #[test]
    fn test_invalid_settings() {
        let bad = SettingsForm {
            name: " ".to_string(),
            tax_rate: "150".to_string(),
            low_stock_threshold: "-1".to_string(),
            sms_sender_id: "AMA-PHONES-ACCRA".to_string(),
            ..form()
        };
        let message = bad.to_settings().unwrap_err().user_message();
        assert!(message.contains("Business name is required."));
        assert!(message.contains("Tax rate must be a percentage between 0 and 100."));
        assert!(message.contains("Low stock threshold must be a whole number."));
        assert!(message.contains("SMS sender ID"));
    }

    #[test]
    fn test_round_trip_from_settings() {
        let settings = form().to_settings().unwrap();
        let back = SettingsForm::from(settings);
        assert_eq!(back.tax_rate, "12.5");
        assert_eq!(back.low_stock_threshold, "5");
    }
}
