//! DELETE SQL generation.

use crate::ast::*;
use crate::error::{MsqlError, MsqlResult};
use crate::transpiler::conditions::group_to_sql;
use crate::transpiler::traits::SqlGenerator;

/// Generate DELETE SQL.
pub fn build_delete<G: SqlGenerator>(query: &Query, generator: &G) -> MsqlResult<String> {
    let subject = query.subject();
    let table = query
        .table()
        .ok_or_else(|| MsqlError::translate(subject, "query has no table"))?;

    let mut sql = String::from("DELETE FROM ");
    sql.push_str(&generator.quote_identifier(&table.name));

    if let Some(group) = query.filter_group() {
        sql.push_str(" WHERE ");
        sql.push_str(&group_to_sql(group, subject, generator)?);
    }

    Ok(sql)
}
