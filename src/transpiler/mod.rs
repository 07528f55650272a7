//! SQL Transpiler for the query model.
//!
//! Converts derived [`Query`] values into SQL text with `:name` placeholders,
//! ready for the named-parameter compiler.

pub mod conditions;
pub mod dml;
pub mod sql;
pub mod traits;


use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::MsqlResult;
use sql::mysql::MysqlGenerator;
use sql::postgres::PostgresGenerator;
use sql::sqlite::SqliteGenerator;

pub use conditions::column_name;
pub use traits::SqlGenerator;

/// Trait for converting query intents to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string for a specific dialect.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> MsqlResult<String>;
}

impl ToSql for Query {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> MsqlResult<String> {
        match dialect {
            Dialect::MySql => render(self, &MysqlGenerator),
            Dialect::Postgres => render(self, &PostgresGenerator),
            Dialect::Sqlite => render(self, &SqliteGenerator),
        }
    }
}

fn render<G: SqlGenerator>(query: &Query, generator: &G) -> MsqlResult<String> {
    match query.subject() {
        Subject::Find | Subject::Count | Subject::Exists => {
            dml::select::build_select(query, generator)
        }
        Subject::Delete => dml::delete::build_delete(query, generator),
    }
}

/// A translator bound to one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    dialect: Dialect,
}

impl Translator {
    /// Select the translator by dialect name; unknown names fail with `UnsupportedDialect`.
    pub fn new(dialect: &str) -> MsqlResult<Self> {
        Ok(Self::for_dialect(Dialect::from_name(dialect)?))
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn translate(&self, query: &Query) -> MsqlResult<String> {
        let sql = query.to_sql_with_dialect(self.dialect)?;
        tracing::trace!("translated {} query for {}: {}", query.subject(), self.dialect, sql);
        Ok(sql)
    }
}
