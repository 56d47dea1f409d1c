//! Typed client for the shop JSON API.
//!
//! Every response is a JSON object wrapped in the `{success, error|message, ...payload}`
//! envelope. [`ShopApi::send`] checks the HTTP status and the envelope, then deserialises the
//! payload from the same object, so payload types never see `success` or `error` (they ignore
//! unknown fields).
//!
//! The caller's [`Credentials`] are forwarded on every request: the bearer token as
//! `Authorization` and the upstream session cookie as `Cookie`.

use anyhow::anyhow;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    api::models::{
        admin::{BenchmarksResponse, EmailLog, ModuleToggle, ModulesResponse, ResetPreview, ResetRequest, ResetResult, ResetScope},
        company::{CompanyDataCheck, CompanyDelete, CompanySettings, SettingsResponse, SmsBalance},
        dashboard::{DashboardStats, Period, SalesMetrics, SalesMetricsResponse, StatsResponse},
        pagination::PagedList,
        records::{Ack, ItemResponse, Record},
        reports::ReportPreview,
        sms::{TopupRequest, TopupSession, TopupVerification},
        swaps::{MarkSold, Swap, SwapResponse},
    },
    auth::Credentials,
    config::ApiConfig,
    errors::{Error, Result},
    types::RecordId,
};

/// Longest slice of a non-JSON body quoted in an error.
const BODY_EXCERPT_LEN: usize = 200;

/// Message used when the shop API rejects the caller's token.
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

pub struct ShopApi {
    client: Client,
    base_url: Url,
}

impl ShopApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Each segment is percent-encoded as a whole, so
    /// record ids taken from page URLs cannot escape their position in the path.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Shop API base URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments.iter().filter(|s| !s.is_empty()));
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, creds: &Credentials, segments: &[&str], query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(segments, query)?;
        self.send(creds, self.client.request(Method::GET, url)).await
    }

    async fn post<B, T>(&self, creds: &Credentials, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments, &[])?;
        self.send(creds, self.client.request(Method::POST, url).json(body)).await
    }

    /// Send a request and unwrap the envelope.
    ///
    /// 1. 401 → [`Error::Unauthenticated`]
    /// 2. unparsable body → [`Error::Upstream`] with an excerpt of the body
    /// 3. `success: false` → [`Error::Api`] (or [`Error::NotFound`] on 404)
    /// 4. any other non-2xx → [`Error::Upstream`]
    /// 5. payload deserialised from the whole object
    async fn send<T: DeserializeOwned>(&self, creds: &Credentials, request: RequestBuilder) -> Result<T> {
        let mut request = request
            .build()
            .map_err(|e| Error::Other(anyhow!("Failed to build shop API request: {e}")))?;
        creds.apply(&mut request)?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "Calling shop API");

        let response = self.client.execute(request).await?;
        let status = response.status();
        debug!(%method, %path, %status, "Shop API responded");

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthenticated {
                message: Some(SESSION_EXPIRED.to_string()),
            });
        }

        let body = response.text().await?;
        let value: Value = match serde_json::from_str(&body) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                return Err(Error::Upstream {
                    status,
                    message: excerpt(&body),
                });
            }
        };

        let message = envelope_message(&value);
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            if status == StatusCode::NOT_FOUND {
                return Err(not_found(&path));
            }
            return Err(Error::Api {
                message: message.unwrap_or_else(|| "Request failed".to_string()),
            });
        }
        if !status.is_success() {
            return Err(Error::Upstream {
                status,
                message: message.unwrap_or_else(|| format!("Request failed with status {status}")),
            });
        }

        serde_json::from_value(value).map_err(|e| {
            warn!(%path, "Unexpected shop API payload: {}", e);
            Error::Upstream {
                status,
                message: "Unexpected response from the server".to_string(),
            }
        })
    }

    // ---- generic entities ----

    #[instrument(skip(self, creds), err)]
    pub async fn list_records(
        &self,
        creds: &Credentials,
        api_path: &str,
        page: u32,
        per_page: u32,
        search: Option<&str>,
    ) -> Result<PagedList<Record>> {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        self.get(creds, &under(api_path, &[]), &query).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn get_record(&self, creds: &Credentials, api_path: &str, id: &RecordId) -> Result<Record> {
        let resp: ItemResponse = self.get(creds, &under(api_path, &[id.as_str()]), &[]).await?;
        Ok(resp.item)
    }

    #[instrument(skip(self, creds, body), err)]
    pub async fn create_record(&self, creds: &Credentials, api_path: &str, body: &Value) -> Result<Ack> {
        self.post(creds, &under(api_path, &[]), body).await
    }

    #[instrument(skip(self, creds, body), err)]
    pub async fn update_record(&self, creds: &Credentials, api_path: &str, id: &RecordId, body: &Value) -> Result<Ack> {
        self.post(creds, &under(api_path, &[id.as_str(), "update"]), body).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn delete_record(&self, creds: &Credentials, api_path: &str, id: &RecordId) -> Result<Ack> {
        self.post(creds, &under(api_path, &[id.as_str(), "delete"]), &serde_json::json!({}))
            .await
    }

    // ---- companies ----

    #[instrument(skip(self, creds), err)]
    pub async fn check_company_data(&self, creds: &Credentials, id: &RecordId) -> Result<CompanyDataCheck> {
        self.get(creds, &["api", "companies", id.as_str(), "check-data"], &[]).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn delete_company(&self, creds: &Credentials, id: &RecordId, force: bool) -> Result<Ack> {
        self.post(creds, &["api", "companies", id.as_str(), "delete"], &CompanyDelete { force })
            .await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn company_settings(&self, creds: &Credentials) -> Result<CompanySettings> {
        let resp: SettingsResponse = self.get(creds, &["api", "company", "settings"], &[]).await?;
        Ok(resp.settings)
    }

    #[instrument(skip_all, err)]
    pub async fn update_company_settings(&self, creds: &Credentials, settings: &CompanySettings) -> Result<Ack> {
        self.post(creds, &["api", "company", "settings", "update"], settings).await
    }

    // ---- SMS ----

    #[instrument(skip(self, creds), err)]
    pub async fn sms_balance(&self, creds: &Credentials) -> Result<SmsBalance> {
        self.get(creds, &["api", "company", "sms-balance"], &[]).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn initiate_topup(&self, creds: &Credentials, request: &TopupRequest) -> Result<TopupSession> {
        self.post(creds, &["api", "sms", "paystack", "initiate"], request).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn verify_topup(&self, creds: &Credentials, reference: &str) -> Result<TopupVerification> {
        self.get(creds, &["api", "sms", "paystack", "verify"], &[("reference", reference.to_string())])
            .await
    }

    // ---- dashboard & reports ----

    #[instrument(skip(self, creds), err)]
    pub async fn dashboard_stats(&self, creds: &Credentials) -> Result<DashboardStats> {
        let resp: StatsResponse = self.get(creds, &["api", "dashboard", "stats"], &[]).await?;
        Ok(resp.stats)
    }

    #[instrument(skip(self, creds), err)]
    pub async fn sales_metrics(&self, creds: &Credentials, period: Period) -> Result<SalesMetrics> {
        let resp: SalesMetricsResponse = self
            .get(creds, &["api", "dashboard", "sales-metrics"], &[("period", period.as_str().to_string())])
            .await?;
        Ok(resp.metrics)
    }

    #[instrument(skip(self, creds), err)]
    pub async fn report_preview(&self, creds: &Credentials, report_type: &str, start_date: &str, end_date: &str) -> Result<ReportPreview> {
        let query = [
            ("type", report_type.to_string()),
            ("start_date", start_date.to_string()),
            ("end_date", end_date.to_string()),
        ];
        self.get(creds, &["api", "reports", "preview"], &query).await
    }

    // ---- swaps ----

    #[instrument(skip(self, creds), err)]
    pub async fn list_swaps(&self, creds: &Credentials, page: u32, per_page: u32, status: Option<&str>) -> Result<PagedList<Swap>> {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            query.push(("status", status.to_string()));
        }
        self.get(creds, &["api", "swaps"], &query).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn get_swap(&self, creds: &Credentials, id: &RecordId) -> Result<Swap> {
        let resp: SwapResponse = self.get(creds, &["api", "swaps", id.as_str()], &[]).await?;
        Ok(resp.swap)
    }

    #[instrument(skip(self, creds), err)]
    pub async fn mark_swap_sold(&self, creds: &Credentials, request: &MarkSold) -> Result<Ack> {
        self.post(creds, &["api", "swaps", "mark-sold"], request).await
    }

    // ---- platform administration ----

    #[instrument(skip(self, creds), err)]
    pub async fn benchmarks(&self, creds: &Credentials) -> Result<BenchmarksResponse> {
        self.get(creds, &["api", "admin", "benchmarks"], &[]).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn reset_preview(&self, creds: &Credentials, company_id: &RecordId, scope: ResetScope) -> Result<ResetPreview> {
        let query = [("company_id", company_id.to_string()), ("scope", scope.as_str().to_string())];
        self.get(creds, &["api", "admin", "reset", "preview"], &query).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn reset_execute(&self, creds: &Credentials, request: &ResetRequest) -> Result<ResetResult> {
        self.post(creds, &["api", "admin", "reset", "execute"], request).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn company_modules(&self, creds: &Credentials, company_id: &RecordId) -> Result<ModulesResponse> {
        self.get(creds, &["api", "admin", "company", company_id.as_str(), "modules"], &[]).await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn toggle_module(&self, creds: &Credentials, company_id: &RecordId, toggle: &ModuleToggle) -> Result<Ack> {
        self.post(creds, &["api", "admin", "company", company_id.as_str(), "modules", "toggle"], toggle)
            .await
    }

    #[instrument(skip(self, creds), err)]
    pub async fn email_logs(&self, creds: &Credentials, page: u32, per_page: u32, status: Option<&str>) -> Result<PagedList<EmailLog>> {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            query.push(("status", status.to_string()));
        }
        self.get(creds, &["api", "admin", "email-logs"], &query).await
    }
}

/// Segments of an entity's API path (`api/purchase-orders`) followed by `rest`.
fn under<'a>(api_path: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    api_path.split('/').chain(rest.iter().copied()).collect()
}

/// `error`, falling back to `message`, from an envelope.
fn envelope_message(value: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Name the missing record from the request path: the first segment carrying a digit is the
/// id and the segment before it the resource (`/api/brands/7` → brands, 7).
fn not_found(path: &str) -> Error {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != "api").collect();
    match segments.iter().position(|s| s.chars().any(|c| c.is_ascii_digit())) {
        Some(i) if i > 0 => Error::NotFound {
            resource: segments[i - 1].to_string(),
            id: segments[i].to_string(),
        },
        _ => Error::NotFound {
            resource: "Page".to_string(),
            id: path.to_string(),
        },
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "Empty response".to_string();
    }
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{api_for, test_credentials};
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let api = api_for("http://shop.test/backend");
        let url = api.endpoint(&["api", "brands", "7", "update"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://shop.test/backend/api/brands/7/update");

        let api = api_for("http://shop.test/");
        let url = api
            .endpoint(&["api", "brands"], &[("page", "2".to_string()), ("search", "a b".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "http://shop.test/api/brands?page=2&search=a+b");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = api_for("http://shop.test");
        let url = api.endpoint(&["api", "swaps", "a?b"], &[]).unwrap();
        assert_eq!(url.path(), "/api/swaps/a%3Fb");

        let url = api.endpoint(&under("api/brands", &["../users"]), &[]).unwrap();
        assert_eq!(url.path(), "/api/brands/..%2Fusers");
    }

    #[test]
    fn test_not_found_from_path() {
        match not_found("/api/brands/12") {
            Error::NotFound { resource, id } => {
                assert_eq!(resource, "brands");
                assert_eq!(id, "12");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("   "), "Empty response");
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), BODY_EXCERPT_LEN + 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_forwards_credentials_and_unwraps_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/company/sms-balance"))
            .and(header("authorization", "Bearer tok-123"))
            .and(header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "balance": 120,
                "sender_id": "AMAPHONES"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let balance = api.sms_balance(&test_credentials()).await.unwrap();
        assert_eq!(balance.balance, Decimal::from(120));
        assert_eq!(balance.sender_id.as_deref(), Some("AMAPHONES"));
    }

    #[test_log::test(tokio::test)]
    async fn test_token_unfit_for_header_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/company/sms-balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(0)
            .mount(&server)
            .await;

        let creds = Credentials {
            bearer: Some("tok\n123".to_string()),
            session_cookie: None,
        };
        let err = api_for(&server.uri()).sms_balance(&creds).await.unwrap_err();
        assert!(err.is_unauthenticated(), "got {err:?}");
        assert_ne!(err.user_message(), crate::errors::NETWORK_ERROR_MESSAGE);
    }

    #[test_log::test(tokio::test)]
    async fn test_success_false_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/brands"))
            .and(body_json(json!({"name": "Tecno"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "error": "Brand already exists"
            })))
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let err = api
            .create_record(&test_credentials(), "api/brands", &json!({"name": "Tecno"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { ref message } if message == "Brand already exists"));
    }

    #[test_log::test(tokio::test)]
    async fn test_message_is_error_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/swaps/mark-sold"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Swap already sold"
            })))
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let request = MarkSold {
            swap_id: json!(4),
            sale_price: Decimal::from(900),
        };
        let err = api.mark_swap_sold(&test_credentials(), &request).await.unwrap_err();
        assert_eq!(err.user_message(), "Swap already sold");
    }

    #[test_log::test(tokio::test)]
    async fn test_unauthorized_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard/stats"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false, "error": "Token expired"})))
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let err = api.dashboard_stats(&test_credentials()).await.unwrap_err();
        assert!(err.is_unauthenticated());
    }

    #[test_log::test(tokio::test)]
    async fn test_not_found_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/suppliers/99"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"success": false, "error": "Not found"})))
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let err = api
            .get_record(&test_credentials(), "api/suppliers", &RecordId::new("99"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_non_json_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/benchmarks"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let err = api.benchmarks(&test_credentials()).await.unwrap_err();
        match err {
            Error::Upstream { status, message } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert!(message.contains("Bad Gateway"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_list_sends_paging_and_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/brands"))
            .and(query_param("page", "3"))
            .and(query_param("per_page", "20"))
            .and(query_param("search", "sam"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "items": [{"id": 1, "name": "Samsung"}],
                "pagination": {"page": 3, "per_page": 20, "total": 41, "total_pages": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let list = api
            .list_records(&test_credentials(), "api/brands", 3, 20, Some(" sam "))
            .await
            .unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.page_info().total_pages, 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_reset_preview_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/reset/preview"))
            .and(query_param("company_id", "5"))
            .and(query_param("scope", "inventory"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "counts": {"products": 40, "purchase_orders": 2}
            })))
            .mount(&server)
            .await;

        let api = api_for(&server.uri());
        let preview = api
            .reset_preview(&test_credentials(), &RecordId::new("5"), ResetScope::Inventory)
            .await
            .unwrap();
        assert_eq!(preview.total(), 42);
    }

    #[test_log::test(tokio::test)]
    async fn test_unreachable_server_is_transport_error() {
        // Nothing listens on port 9 on loopback
        let api = api_for("http://127.0.0.1:9");
        let err = api.sms_balance(&test_credentials()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.user_message(), crate::errors::NETWORK_ERROR_MESSAGE);
    }
}
