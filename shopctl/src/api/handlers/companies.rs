//! Company deletion.
//!
//! Deleting a company that still holds business data wipes that data as well, so the
//! confirmation page first shows what the company holds (`check-data`). When anything is there,
//! the user has to type the company name before the delete is sent with `force: true`.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    AppState,
    api::models::{company::CompanyDataCheck, records::record_text},
    auth::Credentials,
    errors::{Error, Result},
    format::number,
    types::RecordId,
    views::{Banner, BannerQuery, Layout},
};

use super::{humanize, redirect_on_error, redirect_with};

#[derive(Debug, Default, Deserialize)]
pub struct DeleteCompanyForm {
    #[serde(default)]
    pub confirm_name: String,
}

#[derive(Debug, Serialize)]
struct CountRow {
    label: String,
    count: String,
}

#[derive(Debug, Serialize)]
struct DeletePage {
    id: String,
    company_name: String,
    has_data: bool,
    counts: Vec<CountRow>,
}

/// Name to confirm against: the one from the data check, else the company record's.
async fn company_name(state: &AppState, creds: &Credentials, id: &RecordId, check: &CompanyDataCheck) -> Result<String> {
    if let Some(name) = check.company_name.as_deref().filter(|n| !n.trim().is_empty()) {
        return Ok(name.to_string());
    }
    let record = state.api.get_record(creds, "api/companies", id).await?;
    Ok(record_text(&record, "name"))
}

fn render_confirmation(
    state: &AppState,
    id: &RecordId,
    name: String,
    check: &CompanyDataCheck,
    banners: Vec<Banner>,
    status: StatusCode,
) -> Result<Response> {
    let page = DeletePage {
        id: id.to_string(),
        has_data: check.holds_data(),
        counts: check
            .counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(key, n)| CountRow {
                label: humanize(key),
                count: number((*n).into()),
            })
            .collect(),
        company_name: name.clone(),
    };
    let layout = Layout::new(format!("Delete {name}"), "companies").with_banners(banners);
    let html = state.views.render("company_delete.html", &layout, page)?;
    Ok((status, html).into_response())
}

/// `GET /companies/{id}/delete`
#[instrument(skip_all, fields(id = %id))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    creds: Credentials,
    Query(banners): Query<BannerQuery>,
) -> Result<Response> {
    let id = RecordId::new(id);
    let check = state.api.check_company_data(&creds, &id).await?;
    let name = company_name(&state, &creds, &id, &check).await?;
    render_confirmation(&state, &id, name, &check, banners.banners(), StatusCode::OK)
}

/// `POST /companies/{id}/delete`
#[instrument(skip_all, fields(id = %id))]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
    creds: Credentials,
    Form(form): Form<DeleteCompanyForm>,
) -> Result<Response> {
    let id = RecordId::new(id);
    let back = format!("/companies/{id}/delete");

    let check = match state.api.check_company_data(&creds, &id).await {
        Ok(check) => check,
        Err(e) => return redirect_on_error(&back, e),
    };
    let name = company_name(&state, &creds, &id, &check).await?;
    let force = check.holds_data();

    if force && form.confirm_name.trim() != name.trim() {
        let err = Error::BadRequest {
            message: format!("Type the company name \"{name}\" exactly to confirm deletion."),
        };
        return render_confirmation(&state, &id, name, &check, vec![Banner::from(&err)], err.status_code());
    }

    match state.api.delete_company(&creds, &id, force).await {
        Ok(ack) => {
            info!(company = %id, force, "Company deleted");
            let message = ack.message.unwrap_or_else(|| format!("Company {name} deleted."));
            Ok(redirect_with("/companies", Banner::success(message)))
        }
        Err(e) => redirect_on_error(&back, e),
    }
}
