use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text written in the `tax` column when no amount could be computed.
pub const TAX_UNAVAILABLE: &str = "NaN";

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Absent,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn from_option(value: Option<&str>) -> Self {
        value.map(FieldValue::text).unwrap_or(FieldValue::Absent)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            FieldValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Cell text as written to the output file.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) if !n.is_finite() => TAX_UNAVAILABLE.to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Absent => String::new(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// One row keyed by column name, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.data.get(column)
    }

    /// Inserts or overwrites a column. Overwriting keeps the column position.
    pub fn insert(&mut self, column: impl Into<String>, value: FieldValue) {
        self.data.insert(column.into(), value);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    fn non_empty_text(&self, column: &str) -> Option<String> {
        self.get(column)
            .map(FieldValue::render)
            .filter(|s| !s.trim().is_empty())
    }

    /// Address-shaped subset used as resolution input.
    pub fn address(&self) -> Address {
        Address {
            line1: self.non_empty_text("line1"),
            line2: self.non_empty_text("line2"),
            line3: self.non_empty_text("line3"),
            city: self.non_empty_text("city"),
            region: self.non_empty_text("region"),
            country: self.non_empty_text("country"),
            postal_code: self.non_empty_text("postalCode"),
        }
    }

    pub fn amount(&self) -> Option<f64> {
        self.get("amount").and_then(FieldValue::as_f64)
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Postal address as sent to and returned by the tax service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMessage {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refers_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ServiceMessage {
    pub fn new(summary: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            details: Some(details.into()),
            ..Self::default()
        }
    }
}

/// Response of an address resolution call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResolution {
    #[serde(default)]
    pub validated_addresses: Vec<Address>,
    #[serde(default)]
    pub messages: Vec<ServiceMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStatus {
    Resolved,
    /// More than one candidate came back; the first was used.
    Ambiguous(usize),
    Unresolved,
    Failed,
}

/// Outcome of the address step for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub address: Address,
    pub diagnostics: String,
    pub status: AddressStatus,
}

impl ResolvedAddress {
    pub fn failed(diagnostics: impl Into<String>) -> Self {
        Self {
            address: Address::default(),
            diagnostics: diagnostics.into(),
            status: AddressStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxLine {
    pub number: String,
    pub quantity: f64,
    pub amount: f64,
    pub item_code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxAddresses {
    pub single_location: Address,
}

/// Simulated sales order sent to the tax computation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDocument {
    #[serde(rename = "type")]
    pub document_type: String,
    pub company_code: String,
    pub date: NaiveDate,
    pub customer_code: String,
    pub purchase_order_no: String,
    pub addresses: TaxAddresses,
    pub lines: Vec<TaxLine>,
    pub commit: bool,
    pub currency_code: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculation {
    #[serde(default)]
    pub total_tax_calculated: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaxOutcome {
    Computed(f64),
    Failed(String),
}

impl TaxOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, TaxOutcome::Failed(_))
    }

    pub fn to_field(&self) -> FieldValue {
        match self {
            TaxOutcome::Computed(amount) => FieldValue::Number(*amount),
            TaxOutcome::Failed(_) => FieldValue::text(TAX_UNAVAILABLE),
        }
    }
}

/// Rows read from the input file together with its header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTable {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    /// Header of the input file, in input order.
    pub input_columns: Vec<String>,
    pub processed_records: Vec<Record>,
    pub ambiguous_addresses: usize,
    pub unresolved_addresses: usize,
    pub address_failures: usize,
    pub tax_failures: usize,
}
