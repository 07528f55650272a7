//! WHERE clause rendering.

use convert_case::{Case, Casing};

use crate::ast::*;
use crate::error::{MsqlError, MsqlResult};
use crate::transpiler::traits::SqlGenerator;

/// Column name for a field as written in a method name.
pub fn column_name(field: &str) -> String {
    field.to_case(Case::Snake)
}

/// Render a filter group; nested groups are parenthesized.
pub fn group_to_sql<G: SqlGenerator>(
    group: &FilterGroup,
    subject: Subject,
    generator: &G,
) -> MsqlResult<String> {
    let mut sql = String::new();
    for (i, node) in group.nodes().iter().enumerate() {
        if i > 0 {
            sql.push(' ');
            sql.push_str(group.connectives()[i - 1].sql_token());
            sql.push(' ');
        }
        match node {
            FilterNode::Predicate(p) => sql.push_str(&predicate_to_sql(p, subject, generator)?),
            FilterNode::Group(g) => {
                sql.push('(');
                sql.push_str(&group_to_sql(g, subject, generator)?);
                sql.push(')');
            }
        }
    }
    Ok(sql)
}

/// Render one predicate with `:name` placeholders.
pub fn predicate_to_sql<G: SqlGenerator>(
    predicate: &FilterPredicate,
    subject: Subject,
    generator: &G,
) -> MsqlResult<String> {
    if !predicate.is_filled() {
        return Err(MsqlError::translate(
            subject,
            format!(
                "predicate on '{}' ({:?}) wants {} argument name(s), has {}",
                predicate.field,
                predicate.op,
                predicate.op.arity(),
                predicate.args.len()
            ),
        ));
    }

    let column = generator.quote_identifier(&column_name(&predicate.field));
    let op = predicate.op.sql_token();
    let args = &predicate.args;
    Ok(match predicate.op {
        Operator::IsNull | Operator::IsNotNull => format!("{} {}", column, op),
        Operator::In | Operator::NotIn => format!("{} {} (:{})", column, op, args[0]),
        Operator::Between => format!("{} {} :{} AND :{}", column, op, args[0], args[1]),
        _ => format!("{} {} :{}", column, op, args[0]),
    })
}
