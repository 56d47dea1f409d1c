//! Report preview payload: server-defined columns plus rows and optional totals.

use serde::Deserialize;

use crate::api::models::records::Record;
use crate::format::ValueKind;

/// `GET /api/reports/preview`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportPreview {
    pub title: Option<String>,
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<Record>,
    pub totals: Option<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportColumn {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: ValueKind,
}

impl ReportColumn {
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.key.replace('_', " "))
    }
}

impl ReportPreview {
    /// Columns to render. When the API sends none, they are taken from the first row's keys.
    pub fn effective_columns(&self) -> Vec<ReportColumn> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        self.rows
            .first()
            .map(|row| {
                row.keys()
                    .map(|key| ReportColumn {
                        key: key.clone(),
                        label: None,
                        kind: ValueKind::Text,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Report families offered by the preview page.
pub const REPORT_TYPES: [(&str, &str); 6] = [
    ("sales", "Sales"),
    ("inventory", "Inventory"),
    ("repairs", "Repairs"),
    ("swaps", "Swaps"),
    ("staff", "Staff performance"),
    ("profit", "Profit & loss"),
];
