//! Observability: the structured logger.

pub mod logger;

pub use self::logger::{Logger, Severity};
