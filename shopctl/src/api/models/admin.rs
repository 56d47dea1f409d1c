//! Platform administration payloads: benchmarks, data reset, per-company modules, email logs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};
use std::collections::BTreeMap;

use crate::types::RecordId;

/// `GET /api/admin/benchmarks`
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarksResponse {
    #[serde(default)]
    pub benchmarks: Vec<Benchmark>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Benchmark {
    pub name: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub duration_ms: Decimal,
    #[serde(default)]
    pub threshold_ms: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Outcome class of a benchmark, used for the badge colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkStatus {
    Pass,
    Warn,
    Fail,
}

impl Benchmark {
    /// Status reported by the API, or derived from the threshold: within it passes, up to twice
    /// it warns, beyond that fails. No threshold and no status counts as a pass.
    pub fn status(&self) -> BenchmarkStatus {
        match self.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("pass" | "ok" | "passed") => BenchmarkStatus::Pass,
            Some("warn" | "warning" | "slow") => BenchmarkStatus::Warn,
            Some("fail" | "failed" | "error") => BenchmarkStatus::Fail,
            _ => match self.threshold_ms {
                Some(limit) if self.duration_ms > limit * Decimal::TWO => BenchmarkStatus::Fail,
                Some(limit) if self.duration_ms > limit => BenchmarkStatus::Warn,
                _ => BenchmarkStatus::Pass,
            },
        }
    }
}

/// What a company data reset covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetScope {
    /// Sales, repairs, swaps and their payments
    #[default]
    Transactions,
    /// Products, stock movements and purchase orders
    Inventory,
    /// Everything except the company record and its users
    All,
}

impl ResetScope {
    pub const ALL: [ResetScope; 3] = [ResetScope::Transactions, ResetScope::Inventory, ResetScope::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResetScope::Transactions => "transactions",
            ResetScope::Inventory => "inventory",
            ResetScope::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResetScope::Transactions => "Transactions (sales, repairs, swaps)",
            ResetScope::Inventory => "Inventory (products, stock, purchase orders)",
            ResetScope::All => "All business data",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "transactions" => Some(ResetScope::Transactions),
            "inventory" => Some(ResetScope::Inventory),
            "all" => Some(ResetScope::All),
            _ => None,
        }
    }
}

/// `GET /api/admin/reset/preview`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPreview {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

impl ResetPreview {
    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, n| acc.saturating_add(*n))
    }
}

/// `POST /api/admin/reset/execute` body
#[derive(Debug, Clone, Serialize)]
pub struct ResetRequest {
    pub company_id: serde_json::Value,
    pub scope: ResetScope,
}

/// `POST /api/admin/reset/execute` result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetResult {
    #[serde(default)]
    pub deleted: BTreeMap<String, u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/admin/company/{id}/modules`
#[derive(Debug, Clone, Deserialize)]
pub struct ModulesResponse {
    #[serde(default)]
    pub company: Option<CompanySummary>,
    #[serde(default)]
    pub modules: Vec<CompanyModule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanySummary {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyModule {
    #[serde(alias = "module")]
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub enabled: bool,
}

impl CompanyModule {
    /// `pos_sales` → `Pos Sales` when the API sends no display name.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.key
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `POST /api/admin/company/{id}/modules/toggle` body
#[derive(Debug, Clone, Serialize)]
pub struct ModuleToggle {
    pub module: String,
    pub enabled: bool,
}

/// One row of `GET /api/admin/email-logs`
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct EmailLog {
    #[serde(default, alias = "to")]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub recipient: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub subject: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub status: String,
    #[serde(default, alias = "created_at")]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bench(v: serde_json::Value) -> Benchmark {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_benchmark_status_from_api() {
        assert_eq!(bench(json!({"name": "a", "status": "FAILED"})).status(), BenchmarkStatus::Fail);
        assert_eq!(bench(json!({"name": "a", "status": "ok"})).status(), BenchmarkStatus::Pass);
        assert_eq!(bench(json!({"name": "a", "status": "slow"})).status(), BenchmarkStatus::Warn);
    }

    #[test]
    fn test_benchmark_status_from_threshold() {
        assert_eq!(
            bench(json!({"name": "a", "duration_ms": 90, "threshold_ms": 100})).status(),
            BenchmarkStatus::Pass
        );
        assert_eq!(
            bench(json!({"name": "a", "duration_ms": 150, "threshold_ms": 100})).status(),
            BenchmarkStatus::Warn
        );
        assert_eq!(
            bench(json!({"name": "a", "duration_ms": 201, "threshold_ms": 100})).status(),
            BenchmarkStatus::Fail
        );
        assert_eq!(bench(json!({"name": "a", "duration_ms": 5000})).status(), BenchmarkStatus::Pass);
    }

    #[test]
    fn test_reset_scope_parse() {
        assert_eq!(ResetScope::parse("inventory"), Some(ResetScope::Inventory));
        assert_eq!(ResetScope::parse("everything"), None);
    }

    #[test]
    fn test_reset_preview_total() {
        let preview: ResetPreview = serde_json::from_value(json!({"counts": {"sales": 10, "repairs": 3}})).unwrap();
        assert_eq!(preview.total(), 13);
    }

    #[test]
    fn test_module_display_name() {
        let m: CompanyModule = serde_json::from_value(json!({"key": "pos_sales", "enabled": true})).unwrap();
        assert_eq!(m.display_name(), "Pos Sales");

        let m: CompanyModule = serde_json::from_value(json!({"module": "repairs", "name": "Repair Desk"})).unwrap();
        assert_eq!(m.display_name(), "Repair Desk");
        assert!(!m.enabled);
    }

    #[test]
    fn test_null_benchmark_duration_and_log_fields() {
        let b = bench(json!({"name": "a", "duration_ms": null, "threshold_ms": 100}));
        assert_eq!(b.duration_ms, Decimal::ZERO);
        assert_eq!(b.status(), BenchmarkStatus::Pass);

        let log: EmailLog = serde_json::from_value(json!({"to": "a@b.co", "subject": null, "status": "sent"})).unwrap();
        assert_eq!(log.subject, "");

        let m: CompanyModule = serde_json::from_value(json!({"key": "repairs", "enabled": null})).unwrap();
        assert!(!m.enabled);
    }

    #[test]
    fn test_reset_preview_total_saturates() {
        let preview: ResetPreview =
            serde_json::from_value(json!({"counts": {"sales": u64::MAX, "repairs": 3}})).unwrap();
        assert_eq!(preview.total(), u64::MAX);
    }
}
