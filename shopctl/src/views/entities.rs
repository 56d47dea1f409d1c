//! Registry of the plain CRUD entities.
//!
//! Brands, suppliers, staff and the rest differ only in their fields, so one set of handlers
//! serves all of them from an [`EntitySpec`]: list columns for the table, form fields for
//! create/edit, and the validation that turns a submitted form into the JSON body the shop API
//! expects.

use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::HashMap, str::FromStr};

use crate::{
    api::models::records::{Record, record_id, record_text},
    errors::{Error, Result},
    format::{ValueKind, render_value},
};

/// Submitted form values by field name.
pub type FormValues = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Phone,
    TextArea,
    Number,
    /// Non-negative amount with two decimals
    Money,
    /// `YYYY-MM-DD`
    Date,
    Checkbox,
    Select(&'static [SelectOption]),
    /// Id of a record of another entity, chosen from that entity's list
    Reference(&'static str),
}

impl InputKind {
    fn html_type(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Phone => "tel",
            InputKind::TextArea => "textarea",
            InputKind::Number | InputKind::Money => "number",
            InputKind::Date => "date",
            InputKind::Checkbox => "checkbox",
            InputKind::Select(_) | InputKind::Reference(_) => "select",
        }
    }

    fn display_kind(&self) -> ValueKind {
        match self {
            InputKind::Money => ValueKind::Money,
            InputKind::Number => ValueKind::Number,
            InputKind::Date => ValueKind::Date,
            InputKind::Checkbox => ValueKind::Bool,
            InputKind::Select(_) => ValueKind::Badge,
            _ => ValueKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub required: bool,
}

const fn field(name: &'static str, label: &'static str, input: InputKind, required: bool) -> Field {
    Field {
        name,
        label,
        input,
        required,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ValueKind,
}

const fn col(key: &'static str, label: &'static str, kind: ValueKind) -> Column {
    Column { key, label, kind }
}

#[derive(Debug)]
pub struct EntitySpec {
    /// URL segment of the console pages (`/brands`)
    pub slug: &'static str,
    /// Shop API collection path
    pub api_path: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub columns: &'static [Column],
    pub fields: &'static [Field],
    /// Shown on the form and detail pages
    pub notice: Option<&'static str>,
    /// Deletion goes through the data check and name confirmation instead of a plain delete
    pub checked_delete: bool,
}

const STAFF_ROLES: &[SelectOption] = &[
    opt("manager", "Manager"),
    opt("sales", "Sales"),
    opt("technician", "Technician"),
    opt("cashier", "Cashier"),
];

const USER_ROLES: &[SelectOption] = &[
    opt("super_admin", "Super admin"),
    opt("admin", "Company admin"),
    opt("manager", "Manager"),
    opt("staff", "Staff"),
];

const PURCHASE_ORDER_STATUSES: &[SelectOption] = &[
    opt("draft", "Draft"),
    opt("ordered", "Ordered"),
    opt("received", "Received"),
    opt("cancelled", "Cancelled"),
];

pub static ENTITIES: &[EntitySpec] = &[
    EntitySpec {
        slug: "companies",
        api_path: "api/companies",
        singular: "Company",
        plural: "Companies",
        columns: &[
            col("name", "Name", ValueKind::Text),
            col("email", "Email", ValueKind::Text),
            col("phone", "Phone", ValueKind::Text),
            col("is_active", "Active", ValueKind::Bool),
        ],
        fields: &[
            field("name", "Name", InputKind::Text, true),
            field("email", "Email", InputKind::Email, false),
            field("phone", "Phone", InputKind::Phone, false),
            field("address", "Address", InputKind::TextArea, false),
            field("is_active", "Active", InputKind::Checkbox, false),
        ],
        notice: None,
        checked_delete: true,
    },
    EntitySpec {
        slug: "brands",
        api_path: "api/brands",
        singular: "Brand",
        plural: "Brands",
        columns: &[
            col("name", "Name", ValueKind::Text),
            col("description", "Description", ValueKind::Text),
            col("created_at", "Created", ValueKind::Date),
        ],
        fields: &[
            field("name", "Name", InputKind::Text, true),
            field("description", "Description", InputKind::TextArea, false),
        ],
        notice: None,
        checked_delete: false,
    },
    EntitySpec {
        slug: "categories",
        api_path: "api/categories",
        singular: "Category",
        plural: "Categories",
        columns: &[
            col("name", "Name", ValueKind::Text),
            col("description", "Description", ValueKind::Text),
            col("created_at", "Created", ValueKind::Date),
        ],
        fields: &[
            field("name", "Name", InputKind::Text, true),
            field("description", "Description", InputKind::TextArea, false),
        ],
        notice: None,
        checked_delete: false,
    },
    EntitySpec {
        slug: "subcategories",
        api_path: "api/subcategories",
        singular: "Subcategory",
        plural: "Subcategories",
        columns: &[
            col("name", "Name", ValueKind::Text),
            col("category_name", "Category", ValueKind::Text),
            col("description", "Description", ValueKind::Text),
        ],
        fields: &[
            field("name", "Name", InputKind::Text, true),
            field("category_id", "Category", InputKind::Reference("categories"), true),
            field("description", "Description", InputKind::TextArea, false),
        ],
        notice: None,
        checked_delete: false,
    },
    EntitySpec {
        slug: "suppliers",
        api_path: "api/suppliers",
        singular: "Supplier",
        plural: "Suppliers",
        columns: &[
            col("name", "Name", ValueKind::Text),
            col("contact_person", "Contact", ValueKind::Text),
            col("phone", "Phone", ValueKind::Text),
            col("email", "Email", ValueKind::Text),
        ],
        fields: &[
            field("name", "Name", InputKind::Text, true),
            field("contact_person", "Contact person", InputKind::Text, false),
            field("phone", "Phone", InputKind::Phone, false),
            field("email", "Email", InputKind::Email, false),
            field("address", "Address", InputKind::TextArea, false),
        ],
        notice: None,
        checked_delete: false,
    },
    EntitySpec {
        slug: "staff",
        api_path: "api/staff",
        singular: "Staff member",
        plural: "Staff",
        columns: &[
            col("full_name", "Name", ValueKind::Text),
            col("role", "Role", ValueKind::Badge),
            col("phone", "Phone", ValueKind::Text),
            col("is_active", "Active", ValueKind::Bool),
        ],
        fields: &[
            field("full_name", "Full name", InputKind::Text, true),
            field("email", "Email", InputKind::Email, false),
            field("phone", "Phone", InputKind::Phone, false),
            field("role", "Role", InputKind::Select(STAFF_ROLES), true),
            field("is_active", "Active", InputKind::Checkbox, false),
        ],
        notice: None,
        checked_delete: false,
    },
    EntitySpec {
        slug: "users",
        api_path: "api/users",
        singular: "User",
        plural: "Users",
        columns: &[
            col("username", "Username", ValueKind::Text),
            col("email", "Email", ValueKind::Text),
            col("role", "Role", ValueKind::Badge),
            col("company_name", "Company", ValueKind::Text),
            col("is_active", "Active", ValueKind::Bool),
        ],
        fields: &[
            field("username", "Username", InputKind::Text, true),
            field("email", "Email", InputKind::Email, true),
            field("role", "Role", InputKind::Select(USER_ROLES), true),
            field("company_id", "Company", InputKind::Reference("companies"), false),
            field("is_active", "Active", InputKind::Checkbox, false),
        ],
        notice: None,
        checked_delete: false,
    },
    EntitySpec {
        slug: "purchase-orders",
        api_path: "api/purchase-orders",
        singular: "Purchase order",
        plural: "Purchase orders",
        columns: &[
            col("reference", "Reference", ValueKind::Text),
            col("supplier_name", "Supplier", ValueKind::Text),
            col("order_date", "Ordered", ValueKind::Date),
            col("status", "Status", ValueKind::Badge),
            col("total_amount", "Total", ValueKind::Money),
        ],
        fields: &[
            field("supplier_id", "Supplier", InputKind::Reference("suppliers"), true),
            field("reference", "Reference", InputKind::Text, true),
            field("order_date", "Order date", InputKind::Date, true),
            field("expected_date", "Expected date", InputKind::Date, false),
            field("status", "Status", InputKind::Select(PURCHASE_ORDER_STATUSES), false),
            field("total_amount", "Total amount", InputKind::Money, false),
            field("notes", "Notes", InputKind::TextArea, false),
        ],
        notice: Some("Purchase orders are kept for tracking only. Receiving an order does not change inventory counts."),
        checked_delete: false,
    },
];

pub fn lookup(slug: &str) -> Option<&'static EntitySpec> {
    ENTITIES.iter().find(|spec| spec.slug == slug)
}

/// Same as [`lookup`], as a 404 for unknown slugs.
pub fn resolve(slug: &str) -> Result<&'static EntitySpec> {
    lookup(slug).ok_or_else(|| Error::NotFound {
        resource: "Page".to_string(),
        id: format!("/{slug}"),
    })
}

/// An option of a reference select, loaded from the referenced entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Options of reference fields, keyed by field name.
pub type ReferenceChoices = HashMap<&'static str, Vec<Choice>>;

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input: &'static str,
    pub required: bool,
    pub value: String,
    pub checked: bool,
    pub step: Option<&'static str>,
    pub choices: Vec<ChoiceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    pub text: String,
    pub badge: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub id: Option<String>,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub label: &'static str,
    pub value: String,
    pub badge: bool,
}

impl EntitySpec {
    /// "No brands found."
    pub fn empty_message(&self) -> String {
        format!("No {} found.", self.plural.to_lowercase())
    }

    /// Reference fields with the slug of the entity they point at.
    pub fn references(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.fields.iter().filter_map(|f| match f.input {
            InputKind::Reference(target) => Some((f.name, target)),
            _ => None,
        })
    }

    /// Validate a submitted form and build the JSON body for create/update.
    ///
    /// Every field problem is reported at once, in field order.
    pub fn build_body(&self, form: &FormValues) -> Result<Map<String, Value>> {
        let mut body = Map::new();
        let mut problems = Vec::new();

        for field in self.fields {
            let raw = form.get(field.name).map(|v| v.trim()).unwrap_or("");

            if field.input == InputKind::Checkbox {
                body.insert(field.name.to_string(), Value::Bool(is_checked(raw)));
                continue;
            }
            if raw.is_empty() {
                if field.required {
                    problems.push(format!("{} is required.", field.label));
                }
                body.insert(field.name.to_string(), Value::Null);
                continue;
            }

            match parse_input(field, raw) {
                Ok(value) => {
                    body.insert(field.name.to_string(), value);
                }
                Err(problem) => problems.push(problem),
            }
        }

        if problems.is_empty() {
            Ok(body)
        } else {
            Err(Error::BadRequest {
                message: problems.join(" "),
            })
        }
    }

    /// Form values pre-filled from an existing record.
    pub fn values_from_record(&self, record: &Record) -> FormValues {
        self.fields
            .iter()
            .map(|field| {
                let value = match field.input {
                    InputKind::Checkbox => {
                        if record.get(field.name).is_some_and(is_truthy) {
                            "on".to_string()
                        } else {
                            String::new()
                        }
                    }
                    InputKind::Date => record_text(record, field.name).chars().take(10).collect(),
                    _ => record_text(record, field.name),
                };
                (field.name.to_string(), value)
            })
            .collect()
    }

    /// Default values for a new record: active checkboxes ticked.
    pub fn blank_values(&self) -> FormValues {
        self.fields
            .iter()
            .filter(|f| f.input == InputKind::Checkbox && f.name == "is_active")
            .map(|f| (f.name.to_string(), "on".to_string()))
            .collect()
    }

    pub fn form_fields(&self, values: &FormValues, references: &ReferenceChoices) -> Vec<FieldView> {
        self.fields
            .iter()
            .map(|field| {
                let value = values.get(field.name).map(|v| v.trim().to_string()).unwrap_or_default();
                let choices = match field.input {
                    InputKind::Select(options) => options
                        .iter()
                        .map(|o| ChoiceView {
                            value: o.value.to_string(),
                            label: o.label.to_string(),
                            selected: o.value == value,
                        })
                        .collect(),
                    InputKind::Reference(_) => references
                        .get(field.name)
                        .map(|choices| {
                            choices
                                .iter()
                                .map(|c| ChoiceView {
                                    value: c.value.clone(),
                                    label: c.label.clone(),
                                    selected: c.value == value,
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                    _ => Vec::new(),
                };
                FieldView {
                    name: field.name,
                    label: field.label,
                    input: field.input.html_type(),
                    required: field.required,
                    checked: field.input == InputKind::Checkbox && is_checked(&value),
                    step: match field.input {
                        InputKind::Money => Some("0.01"),
                        InputKind::Number => Some("any"),
                        _ => None,
                    },
                    value,
                    choices,
                }
            })
            .collect()
    }

    pub fn list_rows(&self, items: &[Record], currency_symbol: &str) -> Vec<RowView> {
        items
            .iter()
            .map(|record| RowView {
                id: record_id(record).map(|id| id.to_string()),
                cells: self
                    .columns
                    .iter()
                    .map(|c| CellView {
                        text: render_value(c.kind, record.get(c.key).unwrap_or(&Value::Null), currency_symbol),
                        badge: c.kind == ValueKind::Badge,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Label/value pairs for the detail page. Reference fields show the `<entity>_name` the API
    /// sends next to the id when present.
    pub fn detail_rows(&self, record: &Record, currency_symbol: &str) -> Vec<DetailView> {
        self.fields
            .iter()
            .map(|field| {
                let raw = match field.input {
                    InputKind::Reference(_) => field
                        .name
                        .strip_suffix("_id")
                        .and_then(|base| record.get(&format!("{base}_name")))
                        .filter(|v| !v.is_null())
                        .or_else(|| record.get(field.name)),
                    _ => record.get(field.name),
                };
                let kind = field.input.display_kind();
                DetailView {
                    label: field.label,
                    value: render_value(kind, raw.unwrap_or(&Value::Null), currency_symbol),
                    badge: kind == ValueKind::Badge,
                }
            })
            .collect()
    }
}

fn parse_input(field: &Field, raw: &str) -> std::result::Result<Value, String> {
    match field.input {
        InputKind::Email => {
            if is_email(raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(format!("{} must be a valid email address.", field.label))
            }
        }
        InputKind::Number => Decimal::from_str(raw)
            .map(decimal_json)
            .map_err(|_| format!("{} must be a number.", field.label)),
        InputKind::Money => match Decimal::from_str(raw) {
            Ok(amount) if amount.is_sign_negative() && !amount.is_zero() => Err(format!("{} cannot be negative.", field.label)),
            Ok(amount) => Ok(decimal_json(amount)),
            Err(_) => Err(format!("{} must be an amount.", field.label)),
        },
        InputKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|_| Value::String(raw.to_string()))
            .map_err(|_| format!("{} must be a date (YYYY-MM-DD).", field.label)),
        InputKind::Select(options) => {
            if options.iter().any(|o| o.value == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(format!("{} has an invalid choice.", field.label))
            }
        }
        InputKind::Reference(_) => Ok(raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string()))),
        InputKind::Text | InputKind::Phone | InputKind::TextArea | InputKind::Checkbox => Ok(Value::String(raw.to_string())),
    }
}

/// `local@domain.tld`: something before the `@` and a dot inside the domain.
pub fn is_email(raw: &str) -> bool {
    match raw.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !raw.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
        }
        None => false,
    }
}

fn is_checked(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => is_checked(s),
        _ => false,
    }
}

/// JSON number for a decimal: integral values as integers, the rest as floats.
pub fn decimal_json(value: Decimal) -> Value {
    if value.fract().is_zero()
        && let Some(n) = value.to_i64()
    {
        return Value::from(n);
    }
    value
        .to_f64()
        .map(Value::from)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

/// Display label of a record used as a select option.
pub fn record_label(record: &Record) -> String {
    ["name", "full_name", "username", "reference"]
        .iter()
        .map(|key| record_text(record, key))
        .find(|text| !text.trim().is_empty())
        .or_else(|| record_id(record).map(|id| format!("#{id}")))
        .unwrap_or_default()
}

pub fn choices_from(records: &[Record]) -> Vec<Choice> {
    records
        .iter()
        .filter_map(|record| {
            record_id(record).map(|id| Choice {
                value: id.to_string(),
                label: record_label(record),
            })
        })
        .collect()
}
