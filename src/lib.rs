//! # msql: SQL for data-access methods
//!
//! Derives executable SQL, bind arguments and scan targets for data-access
//! methods, either from an explicit SQL template with `:name` placeholders or
//! from the method name itself.
//!
//! ## Quick Example
//!
//! ```rust
//! use msql::prelude::*;
//!
//! let query = msql::parse("FindByBirthdayGTE")
//!     .unwrap()
//!     .unwrap()
//!     .with_table(Table::new("user"))
//!     .fill_named_args(&["time"])
//!     .unwrap();
//!
//! let sql = query.to_sql_with_dialect(Dialect::MySql).unwrap();
//! assert_eq!(sql, "SELECT * FROM `user` WHERE `birthday` >= :time");
//!
//! let bound = compile_named_query(&sql, Dialect::Postgres).unwrap();
//! assert_eq!(bound.names, vec!["time"]);
//! ```
//!
//! ## Naming convention
//!
//! | Piece               | Example               | Meaning                        |
//! |---------------------|-----------------------|--------------------------------|
//! | verb                | `Find` `Count` `Exists` `Delete` | query subject       |
//! | `By`                | `FindById`            | starts the predicate clause    |
//! | `And` / `Or`        | `FindByNameOrAge`     | joins predicates left to right |
//! | operator suffix     | `BirthdayGTE`         | comparison, `EQ` when absent   |

pub mod ast;
pub mod binder;
pub mod config;
pub mod convention;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod named;
pub mod schema;
pub mod statement;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::binder::{bind, bind_arguments, ArgumentList, ScanTarget, ScanTargets};
    pub use crate::config::GeneratorConfig;
    pub use crate::dialect::{BindStyle, Dialect};
    pub use crate::error::*;
    pub use crate::generator::{DeletePlan, Generator, MapperPlan, MethodPlan, SelectPlan};
    pub use crate::named::{compile_named_query, BoundQuery};
    pub use crate::schema::*;
    pub use crate::statement::{Column, Statement, StatementKind};
    pub use crate::transpiler::{ToSql, Translator};
}

/// Parse a method name into a query intent.
///
/// # Example
///
/// ```
/// use msql::ast::Subject;
///
/// let query = msql::parse("CountByNameLike").unwrap().unwrap();
/// assert_eq!(query.subject(), Subject::Count);
/// assert!(msql::parse("InsertUser").unwrap().is_none());
/// ```
pub fn parse(identifier: &str) -> error::MsqlResult<Option<ast::Query>> {
    convention::parse(identifier)
}
