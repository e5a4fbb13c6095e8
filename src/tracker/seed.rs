//! First-run seed data.
//!
//! A fresh database gets the ten stock currencies and one exchange-rate
//! snapshot so the tracker is usable before any network fetch. Seeding is
//! idempotent: it only runs against empty tables.

use std::collections::BTreeMap;

use crate::database::{Database, DatabaseResult};
use crate::observability::{Logger, Severity};
use crate::query::Query;

use super::records::{to_payload, Currency, ExchangeRates};
use super::schema::{CURRENCIES, EXCHANGE_RATES};

pub(crate) fn initial_currencies() -> Vec<Currency> {
    let stock = [
        ("USD", "$", "US Dollar"),
        ("EUR", "\u{20ac}", "Euro"),
        ("GBP", "\u{a3}", "British Pound"),
        ("JPY", "\u{a5}", "Japanese Yen"),
        ("CAD", "C$", "Canadian Dollar"),
        ("AUD", "A$", "Australian Dollar"),
        ("CHF", "Fr", "Swiss Franc"),
        ("CNY", "\u{a5}", "Chinese Yuan"),
        ("INR", "\u{20b9}", "Indian Rupee"),
        ("NZD", "NZ$", "New Zealand Dollar"),
    ];
    stock
        .into_iter()
        .map(|(code, symbol, name)| Currency {
            code: code.into(),
            name: name.into(),
            symbol: symbol.into(),
            is_enabled: true,
        })
        .collect()
}

pub(crate) fn default_exchange_rates(timestamp: i64) -> ExchangeRates {
    let rates: BTreeMap<String, f64> = [
        ("EUR", 0.9629),
        ("GBP", 0.794),
        ("JPY", 150.5095),
        ("CAD", 1.4443),
        ("AUD", 1.609),
        ("CHF", 0.9023),
        ("CNY", 7.2899),
        ("INR", 87.4519),
        ("NZD", 1.7876),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect();

    ExchangeRates {
        timestamp,
        rates,
        base: "USD".into(),
    }
}

/// Seeds empty currency and exchange-rate tables.
pub(crate) fn seed(db: &Database, now: i64) -> DatabaseResult<()> {
    let currencies = db.table(CURRENCIES)?;
    if currencies.query(&Query::new())?.is_empty() {
        let stock = initial_currencies();
        let count = stock.len().to_string();
        for currency in &stock {
            currencies.insert(to_payload(currency)?)?;
        }
        Logger::log(
            Severity::Info,
            "seed_applied",
            &[("table", CURRENCIES), ("count", &count)],
        );
    }

    let exchange_rates = db.table(EXCHANGE_RATES)?;
    if exchange_rates.query(&Query::new())?.is_empty() {
        exchange_rates.insert(to_payload(&default_exchange_rates(now))?)?;
        Logger::log(
            Severity::Info,
            "seed_applied",
            &[("table", EXCHANGE_RATES), ("count", "1")],
        );
    }

    Ok(())
}
