//! SQL statement analysis using sqlparser.
//!
//! Recovers the statement kind and the projected columns of arbitrary SQL text
//! through the dialect's full grammar, so quoting, backticks, aliases and
//! function calls are understood rather than pattern-matched.

use serde::{Deserialize, Serialize};
use sqlparser::ast::{
    Expr, Ident, ObjectName, ObjectNamePart, Select, SelectItem, SelectItemQualifiedWildcardKind,
    SetExpr, Statement as SqlStatement,
};
use sqlparser::dialect::{MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::{Parser, ParserError};

use crate::dialect::Dialect;
use crate::error::{MsqlError, MsqlResult};

/// Kind of a parsed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// A projected column, addressed downstream by its alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Output name, `*` for wildcards
    pub alias: String,
    /// Table qualifier, empty when unqualified or aliased
    pub qualifier: String,
}

impl Column {
    pub fn new(alias: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            qualifier: qualifier.into(),
        }
    }

    pub fn star(qualifier: impl Into<String>) -> Self {
        Self::new("*", qualifier)
    }

    pub fn is_star(&self) -> bool {
        self.alias == "*"
    }
}

/// One parsed SQL statement.
#[derive(Debug, Clone)]
pub struct Statement {
    dialect: Dialect,
    sql: String,
    kind: StatementKind,
    ast: SqlStatement,
}

impl Statement {
    /// Parse `sql` with the grammar of the named dialect.
    pub fn new(dialect: &str, sql: &str) -> MsqlResult<Self> {
        Self::parse(Dialect::from_name(dialect)?, sql)
    }

    /// Parse `sql` with the grammar of `dialect`. Exactly one statement is expected.
    pub fn parse(dialect: Dialect, sql: &str) -> MsqlResult<Self> {
        let mut statements = parse_sql(dialect, sql)
            .map_err(|e| MsqlError::parse(sql, format!("sql parser: {}", e)))?;
        if statements.len() != 1 {
            return Err(MsqlError::parse(
                sql,
                format!("expected exactly one statement, found {}", statements.len()),
            ));
        }
        let ast = statements.remove(0);

        let kind = match &ast {
            SqlStatement::Query { .. } => StatementKind::Select,
            SqlStatement::Insert { .. } => StatementKind::Insert,
            SqlStatement::Update { .. } => StatementKind::Update,
            SqlStatement::Delete { .. } => StatementKind::Delete,
            _ => return Err(MsqlError::parse(sql, "sql parser: unsupported statement kind")),
        };

        Ok(Self {
            dialect,
            sql: sql.to_string(),
            kind,
            ast,
        })
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Projected columns in declaration order.
    pub fn select_columns(&self) -> MsqlResult<Vec<Column>> {
        let select = self.select().ok_or(MsqlError::NotASelectStatement)?;
        select.projection.iter().map(select_column).collect()
    }

    /// Replace a sole `*` / `t.*` projection with explicit columns and re-render.
    ///
    /// The wildcard's qualifier is kept on every generated column.
    pub fn expand_wildcard<S: AsRef<str>>(&self, columns: &[S]) -> MsqlResult<String> {
        let mut ast = self.ast.clone();
        let select = match &mut ast {
            SqlStatement::Query(query) => leftmost_select_mut(&mut query.body),
            _ => None,
        }
        .ok_or(MsqlError::NotASelectStatement)?;

        let qualifier: Vec<Ident> = match select.projection.as_slice() {
            [SelectItem::Wildcard(_)] => Vec::new(),
            [SelectItem::QualifiedWildcard(SelectItemQualifiedWildcardKind::ObjectName(name), _)] => {
                name.0.iter().filter_map(part_ident).cloned().collect()
            }
            _ => {
                return Err(MsqlError::parse(
                    &self.sql,
                    "projection is not a sole wildcard",
                ));
            }
        };

        select.projection = columns
            .iter()
            .map(|column| {
                let ident = self.quoted(column.as_ref());
                if qualifier.is_empty() {
                    SelectItem::UnnamedExpr(Expr::Identifier(ident))
                } else {
                    let mut parts = qualifier.clone();
                    parts.push(ident);
                    SelectItem::UnnamedExpr(Expr::CompoundIdentifier(parts))
                }
            })
            .collect();

        Ok(ast.to_string())
    }

    fn select(&self) -> Option<&Select> {
        match &self.ast {
            SqlStatement::Query(query) => leftmost_select(&query.body),
            _ => None,
        }
    }

    fn quoted(&self, name: &str) -> Ident {
        match self.dialect {
            Dialect::MySql => Ident::with_quote('`', name),
            Dialect::Postgres | Dialect::Sqlite => Ident::with_quote('"', name),
        }
    }
}

fn parse_sql(dialect: Dialect, sql: &str) -> Result<Vec<SqlStatement>, ParserError> {
    match dialect {
        Dialect::MySql => Parser::parse_sql(&MySqlDialect {}, sql),
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql),
        Dialect::Sqlite => Parser::parse_sql(&SQLiteDialect {}, sql),
    }
}

/// The first SELECT of a body; set operations project their left branch's columns.
fn leftmost_select(body: &SetExpr) -> Option<&Select> {
    match body {
        SetExpr::Select(select) => Some(select.as_ref()),
        SetExpr::Query(query) => leftmost_select(&query.body),
        SetExpr::SetOperation { left, .. } => leftmost_select(left),
        _ => None,
    }
}

fn leftmost_select_mut(body: &mut SetExpr) -> Option<&mut Select> {
    match body {
        SetExpr::Select(select) => Some(select.as_mut()),
        SetExpr::Query(query) => leftmost_select_mut(&mut query.body),
        SetExpr::SetOperation { left, .. } => leftmost_select_mut(left),
        _ => None,
    }
}

fn select_column(item: &SelectItem) -> MsqlResult<Column> {
    match item {
        SelectItem::Wildcard(_) => Ok(Column::star("")),
        SelectItem::QualifiedWildcard(kind, _) => match kind {
            SelectItemQualifiedWildcardKind::ObjectName(name) => {
                Ok(Column::star(object_name_tail(name)))
            }
            SelectItemQualifiedWildcardKind::Expr(expr) => Err(
                MsqlError::UnsupportedColumnExpression(format!("wildcard on {}", expr_kind(expr))),
            ),
        },
        SelectItem::ExprWithAlias { alias, .. } => Ok(Column::new(alias.value.clone(), "")),
        SelectItem::UnnamedExpr(expr) => match expr {
            Expr::Identifier(ident) => Ok(Column::new(ident.value.clone(), "")),
            Expr::CompoundIdentifier(idents) => {
                let mut parts = idents.iter().rev();
                let column = parts.next().map(|i| i.value.clone()).unwrap_or_default();
                let qualifier = parts.next().map(|i| i.value.clone()).unwrap_or_default();
                Ok(Column::new(column, qualifier))
            }
            other => Err(MsqlError::UnsupportedColumnExpression(
                expr_kind(other).to_string(),
            )),
        },
    }
}

fn part_ident(part: &ObjectNamePart) -> Option<&Ident> {
    match part {
        ObjectNamePart::Identifier(ident) => Some(ident),
        ObjectNamePart::Function(_) => None,
    }
}

fn object_name_tail(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(part_ident)
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

fn expr_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::Function { .. } => "function call",
        Expr::Case { .. } => "CASE expression",
        Expr::Value { .. } => "literal",
        Expr::Nested { .. } => "nested expression",
        Expr::BinaryOp { .. } => "binary operation",
        Expr::UnaryOp { .. } => "unary operation",
        Expr::Subquery { .. } => "subquery",
        Expr::Cast { .. } => "cast",
        _ => "expression",
    }
}
