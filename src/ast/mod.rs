//! Query model: plain data describing a derived query intent.

pub mod filter;
pub mod operators;
pub mod query;

pub use self::filter::{FilterGroup, FilterNode, FilterPredicate};
pub use self::operators::{Connective, Operator, Subject};
pub use self::query::{Query, Table};
