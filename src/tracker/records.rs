//! Typed records for the tracker tables.
//!
//! Records encode to the camelCase field names the tables store and decode
//! back from stored documents. `Stored<T>` pairs a decoded record with the
//! engine-owned id and timestamps of its document.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::validator::json_type_name;
use crate::schema::ValidationError;
use crate::storage::{Document, StorageError};

/// User display preferences (singleton table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub sort_subscriptions_by: String,
    pub default_currency: String,
    pub total_view_type: String,
    pub total_view_period: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sort_subscriptions_by: "dueDate".into(),
            default_currency: "USD".into(),
            total_view_type: "monthly".into(),
            total_view_period: "upcoming".into(),
        }
    }
}

/// A known currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub is_enabled: bool,
}

/// How often a subscription bills. Periods are fixed-length: a month is
/// thirty days, a year three hundred sixty-five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingFrequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

impl BillingFrequency {
    /// Length of one billing period in milliseconds.
    pub fn period_millis(&self) -> i64 {
        match self {
            BillingFrequency::Weekly => 7 * MILLIS_PER_DAY,
            BillingFrequency::Monthly => 30 * MILLIS_PER_DAY,
            BillingFrequency::Quarterly => 90 * MILLIS_PER_DAY,
            BillingFrequency::Yearly => 365 * MILLIS_PER_DAY,
        }
    }
}

/// A subscription's billing cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycle {
    pub frequency: BillingFrequency,
    /// First billing date, epoch milliseconds
    pub start_date: i64,
    /// Number of billing periods before the subscription ends; open-ended
    /// when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl BillingCycle {
    /// An open-ended monthly cycle starting at `start_date`.
    pub fn monthly(start_date: i64) -> Self {
        Self {
            frequency: BillingFrequency::Monthly,
            start_date,
            duration: None,
        }
    }

    /// The first billing date at or after `from`: the smallest
    /// `start_date + k * period` with non-negative `k` that is >= `from`.
    pub fn next_occurrence(&self, from: i64) -> i64 {
        if self.start_date >= from {
            return self.start_date;
        }
        let period = self.frequency.period_millis();
        let elapsed = from - self.start_date;
        let periods = (elapsed + period - 1) / period;
        self.start_date + periods * period
    }
}

/// A tracked subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub categories: Vec<String>,
    pub billing_cycle: BillingCycle,
}

/// One exchange-rate snapshot against a base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    /// When the snapshot was taken, epoch milliseconds
    pub timestamp: i64,
    /// Units of each currency per one unit of base
    pub rates: BTreeMap<String, f64>,
    pub base: String,
}

/// A decoded record together with its document's reserved fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub record: T,
}

/// Encodes a record as an insert payload.
pub fn to_payload<T: Serialize>(record: &T) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ValidationError::invalid_payload(format!(
            "top-level value is {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(ValidationError::invalid_payload(e.to_string())),
    }
}

/// Decodes a stored document into a typed record. A document that no longer
/// matches the record shape is reported as a corrupted stored value.
pub fn from_document<T: DeserializeOwned>(
    table: &str,
    document: &Document,
) -> Result<Stored<T>, StorageError> {
    let record = serde_json::from_value(Value::Object(document.fields.clone())).map_err(|e| {
        StorageError::corrupted_table(table, format!("document '{}': {}", document.id, e))
    })?;
    Ok(Stored {
        id: document.id.clone(),
        created_at: document.created_at,
        updated_at: document.updated_at,
        record,
    })
}
