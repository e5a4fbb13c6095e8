//! The subscription tracker's own database: concrete table contracts,
//! typed records, first-run seeding, and the cross-document convenience
//! operations the application is built on.
//!
//! Everything here goes through the facade's table handles; this module
//! holds no storage logic of its own.

pub mod records;
pub mod schema;
mod seed;

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::database::{Database, DatabaseOptions, DatabaseResult};
use crate::query::{Query, QueryCondition, SortSpec};
use crate::storage::{KvMedium, StorageError};

pub use self::records::{
    BillingCycle, BillingFrequency, Currency, ExchangeRates, Preferences, Stored, Subscription,
};
pub use self::schema::{
    database_schema, CURRENCIES, EXCHANGE_RATES, NAMESPACE_PREFIX, PREFERENCES, SUBSCRIPTIONS,
};

use self::records::{from_document, to_payload};

/// The tracker database: the facade opened under the `subra_` namespace
/// with the tracker's schema, seeded on first run.
pub struct TrackerDb {
    db: Database,
}

impl TrackerDb {
    /// Opens (and on first run seeds) the tracker database over `medium`.
    pub fn open(medium: Box<dyn KvMedium>) -> DatabaseResult<Self> {
        let db = Database::open(
            database_schema(),
            DatabaseOptions::with_prefix(NAMESPACE_PREFIX),
            medium,
        )?;
        seed::seed(&db, Utc::now().timestamp_millis())?;
        Ok(Self { db })
    }

    /// The underlying facade, for raw table access.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    /// The preferences document, if one has been created.
    pub fn preferences(&self) -> DatabaseResult<Option<Stored<Preferences>>> {
        let docs = self
            .db
            .table(PREFERENCES)?
            .query(&Query::new().limit(1))?;
        match docs.first() {
            Some(doc) => Ok(Some(from_document(PREFERENCES, doc)?)),
            None => Ok(None),
        }
    }

    /// Returns the existing preferences or creates them from the schema
    /// defaults.
    pub fn initialize_preferences(&self) -> DatabaseResult<Stored<Preferences>> {
        if let Some(existing) = self.preferences()? {
            return Ok(existing);
        }
        // an empty payload defaults every field
        let doc = self.db.table(PREFERENCES)?.insert(Map::new())?;
        Ok(from_document(PREFERENCES, &doc)?)
    }

    /// Patches the preferences, creating them first if absent.
    pub fn update_preferences(
        &self,
        patch: Map<String, Value>,
    ) -> DatabaseResult<Stored<Preferences>> {
        let existing = self.initialize_preferences()?;
        let doc = self.db.table(PREFERENCES)?.update(&existing.id, patch)?;
        Ok(from_document(PREFERENCES, &doc)?)
    }

    // ------------------------------------------------------------------
    // Currencies
    // ------------------------------------------------------------------

    /// Enabled currencies, ordered by code.
    pub fn enabled_currencies(&self) -> DatabaseResult<Vec<Stored<Currency>>> {
        let query = Query::new()
            .filter(QueryCondition::eq("isEnabled", Value::Bool(true)))
            .order_by(SortSpec::asc("code"));
        let docs = self.db.table(CURRENCIES)?.query(&query)?;
        docs.iter()
            .map(|doc| Ok(from_document(CURRENCIES, doc)?))
            .collect()
    }

    /// Currency by its code; `None` when unknown.
    pub fn currency_by_code(&self, code: &str) -> DatabaseResult<Option<Stored<Currency>>> {
        let query = Query::new().filter(QueryCondition::eq("code", Value::String(code.into())));
        let docs = self.db.table(CURRENCIES)?.query(&query)?;
        match docs.first() {
            Some(doc) => Ok(Some(from_document(CURRENCIES, doc)?)),
            None => Ok(None),
        }
    }

    /// Patches the currency with the given code. Fails with the not-found
    /// error when the code is unknown.
    pub fn update_currency(
        &self,
        code: &str,
        patch: Map<String, Value>,
    ) -> DatabaseResult<Stored<Currency>> {
        let existing = self
            .currency_by_code(code)?
            .ok_or_else(|| StorageError::not_found(CURRENCIES, code))?;
        let doc = self.db.table(CURRENCIES)?.update(&existing.id, patch)?;
        Ok(from_document(CURRENCIES, &doc)?)
    }

    // ------------------------------------------------------------------
    // Exchange rates
    // ------------------------------------------------------------------

    /// The most recent exchange-rate snapshot, by snapshot timestamp.
    pub fn latest_exchange_rates(&self) -> DatabaseResult<Option<Stored<ExchangeRates>>> {
        let query = Query::new().order_by(SortSpec::desc("timestamp")).limit(1);
        let docs = self.db.table(EXCHANGE_RATES)?.query(&query)?;
        match docs.first() {
            Some(doc) => Ok(Some(from_document(EXCHANGE_RATES, doc)?)),
            None => Ok(None),
        }
    }

    /// Appends a new snapshot stamped with the current time. Snapshot
    /// timestamps are strictly increasing, so the newest snapshot is always
    /// the latest even when two land in the same millisecond.
    pub fn record_exchange_rates(
        &self,
        rates: BTreeMap<String, f64>,
        base: &str,
    ) -> DatabaseResult<Stored<ExchangeRates>> {
        let mut timestamp = Utc::now().timestamp_millis();
        if let Some(latest) = self.latest_exchange_rates()? {
            timestamp = timestamp.max(latest.record.timestamp + 1);
        }
        let snapshot = ExchangeRates {
            timestamp,
            rates,
            base: base.into(),
        };
        let doc = self
            .db
            .table(EXCHANGE_RATES)?
            .insert(to_payload(&snapshot)?)?;
        Ok(from_document(EXCHANGE_RATES, &doc)?)
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// All subscriptions, newest first.
    pub fn subscriptions(&self) -> DatabaseResult<Vec<Stored<Subscription>>> {
        let query = Query::new().order_by(SortSpec::desc("_createdAt"));
        let docs = self.db.table(SUBSCRIPTIONS)?.query(&query)?;
        docs.iter()
            .map(|doc| Ok(from_document(SUBSCRIPTIONS, doc)?))
            .collect()
    }

    /// Subscription by document id; `None` when absent.
    pub fn subscription(&self, id: &str) -> DatabaseResult<Option<Stored<Subscription>>> {
        match self.db.table(SUBSCRIPTIONS)?.get_by_id(id)? {
            Some(doc) => Ok(Some(from_document(SUBSCRIPTIONS, &doc)?)),
            None => Ok(None),
        }
    }

    /// Stores a new subscription.
    pub fn create_subscription(
        &self,
        subscription: &Subscription,
    ) -> DatabaseResult<Stored<Subscription>> {
        let doc = self
            .db
            .table(SUBSCRIPTIONS)?
            .insert(to_payload(subscription)?)?;
        Ok(from_document(SUBSCRIPTIONS, &doc)?)
    }

    /// Patches a subscription by document id.
    pub fn update_subscription(
        &self,
        id: &str,
        patch: Map<String, Value>,
    ) -> DatabaseResult<Stored<Subscription>> {
        let doc = self.db.table(SUBSCRIPTIONS)?.update(id, patch)?;
        Ok(from_document(SUBSCRIPTIONS, &doc)?)
    }

    /// Deletes a subscription by document id.
    pub fn delete_subscription(&self, id: &str) -> DatabaseResult<()> {
        self.db.table(SUBSCRIPTIONS)?.delete(id)?;
        Ok(())
    }

    /// Subscriptions whose next billing date, advanced from the cycle's
    /// start in fixed-length periods, lands inside `[start, end]`.
    pub fn upcoming_payments(
        &self,
        start: i64,
        end: i64,
    ) -> DatabaseResult<Vec<Stored<Subscription>>> {
        let subscriptions = self.subscriptions()?;
        Ok(subscriptions
            .into_iter()
            .filter(|stored| {
                let next = stored.record.billing_cycle.next_occurrence(start);
                next >= start && next <= end
            })
            .collect())
    }
}
