use serde::{Deserialize, Serialize};

/// What a derived query does, read from the leading verb of a method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    /// SELECT rows
    Find,
    /// SELECT COUNT(*)
    Count,
    /// SELECT 1 ... LIMIT 1
    Exists,
    /// DELETE rows
    Delete,
}

impl Subject {
    /// Whether the subject renders to a SELECT statement.
    pub fn is_select(&self) -> bool {
        !matches!(self, Subject::Delete)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Find => write!(f, "FIND"),
            Subject::Count => write!(f, "COUNT"),
            Subject::Exists => write!(f, "EXISTS"),
            Subject::Delete => write!(f, "DELETE"),
        }
    }
}

/// Comparison operator of a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Number of bound arguments the operator consumes.
    pub fn arity(&self) -> usize {
        match self {
            Operator::IsNull | Operator::IsNotNull => 0,
            Operator::Between => 2,
            _ => 1,
        }
    }

    /// SQL token placed between the column and its argument(s).
    pub fn sql_token(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Boolean connective between filter nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn sql_token(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}
