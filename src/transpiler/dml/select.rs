//! SELECT SQL generation.

use crate::ast::*;
use crate::error::{MsqlError, MsqlResult};
use crate::transpiler::conditions::group_to_sql;
use crate::transpiler::traits::SqlGenerator;

/// Generate SELECT SQL for a find, count or exists query.
pub fn build_select<G: SqlGenerator>(query: &Query, generator: &G) -> MsqlResult<String> {
    let subject = query.subject();
    let projection = match subject {
        Subject::Find => "*",
        Subject::Count => "COUNT(*) AS count",
        // bounded existence probe, aliased so the column can be scanned
        Subject::Exists => "1 AS found",
        Subject::Delete => {
            return Err(MsqlError::translate(subject, "delete renders no SELECT"));
        }
    };

    let table = query
        .table()
        .ok_or_else(|| MsqlError::translate(subject, "query has no table"))?;

    let mut sql = String::from("SELECT ");
    sql.push_str(projection);
    sql.push_str(" FROM ");
    sql.push_str(&generator.quote_identifier(&table.name));

    if let Some(group) = query.filter_group() {
        sql.push_str(" WHERE ");
        sql.push_str(&group_to_sql(group, subject, generator)?);
    }

    if subject == Subject::Exists {
        sql.push_str(generator.limit_one());
    }

    Ok(sql)
}
