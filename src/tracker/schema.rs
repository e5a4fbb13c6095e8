//! Table contracts for the subscription tracker.

use chrono::Utc;
use serde_json::json;

use crate::schema::{DatabaseSchema, FieldDef, FieldType, TableSchema};

/// Namespace prefix for every tracker table key.
pub const NAMESPACE_PREFIX: &str = "subra_";

/// Singleton table holding the user's display preferences.
pub const PREFERENCES: &str = "preferences";
/// Known currencies and whether each is enabled.
pub const CURRENCIES: &str = "currencies";
/// The tracked subscriptions.
pub const SUBSCRIPTIONS: &str = "subscriptions";
/// Append-only exchange-rate snapshots.
pub const EXCHANGE_RATES: &str = "exchangeRates";

/// The tracker's full database contract.
pub fn database_schema() -> DatabaseSchema {
    DatabaseSchema::new()
        .table(
            PREFERENCES,
            TableSchema::new()
                .field(
                    "sortSubscriptionsBy",
                    FieldDef::required(FieldType::String).with_default(json!("dueDate")),
                )
                .field(
                    "defaultCurrency",
                    FieldDef::required(FieldType::String).with_default(json!("USD")),
                )
                .field(
                    "totalViewType",
                    FieldDef::required(FieldType::String).with_default(json!("monthly")),
                )
                .field(
                    "totalViewPeriod",
                    FieldDef::required(FieldType::String).with_default(json!("upcoming")),
                ),
        )
        .table(
            CURRENCIES,
            TableSchema::new()
                .field("code", FieldDef::required(FieldType::String).indexed())
                .field("name", FieldDef::required(FieldType::String))
                .field("symbol", FieldDef::required(FieldType::String))
                .field("isEnabled", FieldDef::required(FieldType::Boolean)),
        )
        .table(
            SUBSCRIPTIONS,
            TableSchema::new()
                .field("name", FieldDef::required(FieldType::String))
                .field("description", FieldDef::optional(FieldType::String))
                .field("amount", FieldDef::required(FieldType::Number))
                .field("currency", FieldDef::required(FieldType::String))
                .field("color", FieldDef::optional(FieldType::String))
                .field("icon", FieldDef::optional(FieldType::String))
                .field("categories", FieldDef::required(FieldType::Array))
                .field(
                    "billingCycle",
                    FieldDef::required(FieldType::Object).with_default(json!({
                        "frequency": "monthly",
                        "startDate": Utc::now().timestamp_millis(),
                        "duration": null,
                    })),
                ),
        )
        .table(
            EXCHANGE_RATES,
            TableSchema::new()
                .field("timestamp", FieldDef::required(FieldType::Number).indexed())
                .field("rates", FieldDef::required(FieldType::Object))
                .field("base", FieldDef::required(FieldType::String)),
        )
}
