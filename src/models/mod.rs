use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::utils::deserialize_id;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A DPP entry as returned by `GET /dpp`. Only the id and the three editable
/// fields are interpreted; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: RecordFields) -> Self {
        Record {
            id: id.into(),
            name: Some(fields.name),
            category: Some(fields.category),
            status: Some(fields.status),
            extra: Map::new(),
        }
    }

    /// Entries written through the extraction pipeline use `product_name`.
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref())
            .or_else(|| self.extra_str("product_name"))
            .unwrap_or("")
    }

    pub fn display_category(&self) -> &str {
        non_empty(self.category.as_deref()).unwrap_or("")
    }

    /// Falls back to `compliance_status`, which the backend defaults to "pending".
    pub fn display_status(&self) -> &str {
        non_empty(self.status.as_deref())
            .or_else(|| self.extra_str("compliance_status"))
            .unwrap_or("")
    }

    pub fn fields(&self) -> RecordFields {
        RecordFields {
            name: self.display_name().to_string(),
            category: self.display_category().to_string(),
            status: self.display_status().to_string(),
        }
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        non_empty(self.extra.get(key).and_then(Value::as_str))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Request body for `POST /dpp` and `PUT /dpp/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    pub category: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Category,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Category, FormField::Status];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Category => "Category",
            FormField::Status => "Status",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FormField::Name),
            "category" => Ok(FormField::Category),
            "status" => Ok(FormField::Status),
            other => Err(format!("Unknown field: {}", other)),
        }
    }
}

/// Draft of a record's editable fields. `editing` holds the id of the record
/// being edited and is `None` in create mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub fields: RecordFields,
    pub editing: Option<String>,
}

impl FormState {
    pub fn for_record(record: &Record) -> Self {
        FormState {
            fields: record.fields(),
            editing: Some(record.id.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self == &FormState::default()
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.fields.name,
            FormField::Category => &self.fields.category,
            FormField::Status => &self.fields.status,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.fields.name = value,
            FormField::Category => self.fields.category = value,
            FormField::Status => self.fields.status = value,
        }
    }

    /// Returns the first required field that is empty.
    pub fn validate(&self) -> Result<(), FormField> {
        match FormField::ALL
            .into_iter()
            .find(|field| self.get(*field).is_empty())
        {
            Some(field) => Err(field),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusError {
    Unreachable,
    SaveFailed,
}

/// Backend reachability as last observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectivityStatus {
    #[default]
    Loading,
    Connected,
    Error(StatusError),
}

impl ConnectivityStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ConnectivityStatus::Loading => "Loading...",
            ConnectivityStatus::Connected => "Backend Connected ✅",
            ConnectivityStatus::Error(StatusError::Unreachable) => "❌ Cannot connect to backend",
            ConnectivityStatus::Error(StatusError::SaveFailed) => "❌ Failed to save DPP",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ConnectivityStatus::Error(_))
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// An invoice document as stored by the backend. The shape is owned by the
/// extraction pipeline, so it stays an untyped JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Invoice(pub Map<String, Value>);

impl Invoice {
    pub fn id(&self) -> Option<String> {
        ["_id", "id"]
            .iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(id_string)
    }

    pub fn invoice_number(&self) -> Option<&str> {
        self.0
            .get("invoice_number")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        // Mongo extended JSON: {"$oid": "..."}
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
