//! Generic CRUD pages for every entity in the registry.
//!
//! Routes are shared: `/{entity}` lists, `/{entity}/new` and `POST /{entity}` create,
//! `/{entity}/{id}` shows, `/{entity}/{id}/edit` and `POST /{entity}/{id}` update,
//! `POST /{entity}/{id}/delete` deletes. The entity slug is resolved against
//! [`ENTITIES`](crate::views::entities::ENTITIES); unknown slugs are 404s.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    AppState,
    api::models::pagination::PageQuery,
    auth::Credentials,
    errors::{Error, Result},
    types::RecordId,
    views::{
        Banner, BannerQuery, Layout, Pager,
        entities::{self, EntitySpec, FieldView, FormValues, ReferenceChoices, RowView, choices_from},
    },
};

use super::{redirect_on_error, redirect_with};

/// Reference selects offer at most this many records.
const REFERENCE_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListPage {
    slug: &'static str,
    singular: &'static str,
    plural: &'static str,
    columns: Vec<&'static str>,
    rows: Vec<RowView>,
    empty_message: String,
    search: String,
    checked_delete: bool,
    pager: Option<Pager>,
}

#[derive(Debug, Serialize)]
struct FormPage {
    action: String,
    cancel_href: String,
    submit_label: String,
    notice: Option<&'static str>,
    fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
struct DetailPage {
    slug: &'static str,
    id: String,
    singular: &'static str,
    plural: &'static str,
    notice: Option<&'static str>,
    checked_delete: bool,
    rows: Vec<entities::DetailView>,
}

/// Whether a form creates a record or edits an existing one.
enum FormMode<'a> {
    Create,
    Edit(&'a RecordId),
}

/// `GET /{entity}`
#[instrument(skip_all, fields(entity = %slug))]
pub async fn list_entities(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    creds: Credentials,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<SearchQuery>,
    Query(banners): Query<BannerQuery>,
) -> Result<Html<String>> {
    let spec = entities::resolve(&slug)?;
    let display = &state.config.display;

    let list = state
        .api
        .list_records(&creds, spec.api_path, paging.page(), display.page_size, filter.search.as_deref())
        .await?;
    debug!("Fetched {} {}", list.items.len(), spec.slug);

    let search = filter.search.map(|s| s.trim().to_string()).unwrap_or_default();
    let pager = Pager::build(&list.page_info(), &format!("/{}", spec.slug), &[("search", search.as_str())]);

    let page = ListPage {
        slug: spec.slug,
        singular: spec.singular,
        plural: spec.plural,
        columns: spec.columns.iter().map(|c| c.label).collect(),
        rows: spec.list_rows(&list.items, &display.currency_symbol),
        empty_message: spec.empty_message(),
        search,
        checked_delete: spec.checked_delete,
        pager,
    };
    let layout = Layout::new(spec.plural, spec.slug).with_banners(banners.banners());
    state.views.render("entity_list.html", &layout, page)
}

/// `GET /{entity}/new`
#[instrument(skip_all, fields(entity = %slug))]
pub async fn new_entity(State(state): State<AppState>, Path(slug): Path<String>, creds: Credentials) -> Result<Response> {
    let spec = entities::resolve(&slug)?;
    let references = load_references(&state, &creds, spec).await?;
    render_form(&state, spec, FormMode::Create, &spec.blank_values(), &references, None)
}

/// `POST /{entity}`
#[instrument(skip_all, fields(entity = %slug))]
pub async fn create_entity(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    creds: Credentials,
    Form(form): Form<FormValues>,
) -> Result<Response> {
    let spec = entities::resolve(&slug)?;

    let outcome = match spec.build_body(&form) {
        Ok(body) => state.api.create_record(&creds, spec.api_path, &Value::Object(body)).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(ack) => {
            let message = ack.message.unwrap_or_else(|| format!("{} created.", spec.singular));
            Ok(redirect_with(&format!("/{}", spec.slug), Banner::success(message)))
        }
        Err(e) if e.is_unauthenticated() => Err(e),
        Err(e) => {
            let references = load_references(&state, &creds, spec).await?;
            render_form(&state, spec, FormMode::Create, &form, &references, Some(e))
        }
    }
}

/// `GET /{entity}/{id}`
#[instrument(skip_all, fields(entity = %slug, id = %id))]
pub async fn show_entity(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    creds: Credentials,
    Query(banners): Query<BannerQuery>,
) -> Result<Html<String>> {
    let spec = entities::resolve(&slug)?;
    let id = RecordId::new(id);
    let record = state.api.get_record(&creds, spec.api_path, &id).await?;

    let page = DetailPage {
        slug: spec.slug,
        id: id.to_string(),
        singular: spec.singular,
        plural: spec.plural,
        notice: spec.notice,
        checked_delete: spec.checked_delete,
        rows: spec.detail_rows(&record, &state.config.display.currency_symbol),
    };
    let title = format!("{}: {}", spec.singular, entities::record_label(&record));
    let layout = Layout::new(title, spec.slug).with_banners(banners.banners());
    state.views.render("entity_detail.html", &layout, page)
}

/// `GET /{entity}/{id}/edit`
#[instrument(skip_all, fields(entity = %slug, id = %id))]
pub async fn edit_entity(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    creds: Credentials,
) -> Result<Response> {
    let spec = entities::resolve(&slug)?;
    let id = RecordId::new(id);
    let record = state.api.get_record(&creds, spec.api_path, &id).await?;
    let references = load_references(&state, &creds, spec).await?;
    render_form(&state, spec, FormMode::Edit(&id), &spec.values_from_record(&record), &references, None)
}

/// `POST /{entity}/{id}`
#[instrument(skip_all, fields(entity = %slug, id = %id))]
pub async fn update_entity(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    creds: Credentials,
    Form(form): Form<FormValues>,
) -> Result<Response> {
    let spec = entities::resolve(&slug)?;
    let id = RecordId::new(id);

    let outcome = match spec.build_body(&form) {
        Ok(body) => state.api.update_record(&creds, spec.api_path, &id, &Value::Object(body)).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(ack) => {
            let message = ack.message.unwrap_or_else(|| format!("{} updated.", spec.singular));
            Ok(redirect_with(&format!("/{}/{}", spec.slug, id), Banner::success(message)))
        }
        Err(e) if e.is_unauthenticated() => Err(e),
        Err(e) => {
            let references = load_references(&state, &creds, spec).await?;
            render_form(&state, spec, FormMode::Edit(&id), &form, &references, Some(e))
        }
    }
}

/// `POST /{entity}/{id}/delete`
#[instrument(skip_all, fields(entity = %slug, id = %id))]
pub async fn delete_entity(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    creds: Credentials,
) -> Result<Response> {
    let spec = entities::resolve(&slug)?;
    let id = RecordId::new(id);

    if spec.checked_delete {
        return Ok(Redirect::to(&format!("/{}/{}/delete", spec.slug, id)).into_response());
    }

    let list_path = format!("/{}", spec.slug);
    match state.api.delete_record(&creds, spec.api_path, &id).await {
        Ok(ack) => {
            let message = ack.message.unwrap_or_else(|| format!("{} deleted.", spec.singular));
            Ok(redirect_with(&list_path, Banner::success(message)))
        }
        Err(e) => redirect_on_error(&list_path, e),
    }
}

/// Options for every reference field of `spec`, from the first page of the referenced entity.
async fn load_references(state: &AppState, creds: &Credentials, spec: &EntitySpec) -> Result<ReferenceChoices> {
    let mut choices = ReferenceChoices::new();
    for (field, target) in spec.references() {
        let target = entities::resolve(target)?;
        let list = state
            .api
            .list_records(creds, target.api_path, 1, REFERENCE_LIMIT, None)
            .await?;
        choices.insert(field, choices_from(&list.items));
    }
    Ok(choices)
}

fn render_form(
    state: &AppState,
    spec: &'static EntitySpec,
    mode: FormMode<'_>,
    values: &FormValues,
    references: &ReferenceChoices,
    error: Option<Error>,
) -> Result<Response> {
    let (title, action, cancel_href, submit_label) = match mode {
        FormMode::Create => (
            format!("New {}", spec.singular.to_lowercase()),
            format!("/{}", spec.slug),
            format!("/{}", spec.slug),
            format!("Create {}", spec.singular.to_lowercase()),
        ),
        FormMode::Edit(id) => (
            format!("Edit {}", spec.singular.to_lowercase()),
            format!("/{}/{}", spec.slug, id),
            format!("/{}/{}", spec.slug, id),
            "Save changes".to_string(),
        ),
    };

    let status = error.as_ref().map(Error::status_code).unwrap_or(StatusCode::OK);
    let layout = Layout::new(title, spec.slug).with_banners(error.as_ref().map(Banner::from));

    let page = FormPage {
        action,
        cancel_href,
        submit_label,
        notice: spec.notice,
        fields: spec.form_fields(values, references),
    };
    let html = state.views.render("entity_form.html", &layout, page)?;
    Ok((status, html).into_response())
}
