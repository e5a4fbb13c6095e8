//! Query module: condition/sort types and the linear-scan pipeline.
//!
//! A query runs as filter, then stable multi-key sort, then skip, then
//! limit, in exactly that order. There is no planner and no index; every
//! query scans the full table list.

pub mod filter;
pub mod sort;
pub mod types;

pub use self::types::{Query, QueryCondition, QueryOperator, SortOrder, SortSpec};
