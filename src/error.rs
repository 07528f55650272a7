//! Error types for msql.

use thiserror::Error;

/// The main error type for msql operations.
#[derive(Debug, Error)]
pub enum MsqlError {
    /// The identifier does not start with a known verb.
    #[error("Unrecognized subject: '{0}'. Expected a find, count, exists or delete prefix")]
    UnrecognizedSubject(String),

    /// No translator, grammar or bind style is registered for the dialect.
    #[error("Unsupported dialect: '{0}'")]
    UnsupportedDialect(String),

    /// Malformed SQL or a malformed naming-convention clause.
    #[error("Parse error in '{input}': {message}")]
    Parse { input: String, message: String },

    /// The filter group needs a different number of argument names than supplied.
    #[error("Wrong number of named args, want {wanted} got {got}")]
    ArgumentArityMismatch { wanted: usize, got: usize },

    /// Placeholders and bindable method parameters disagree in count.
    #[error("Wrong number of args, want {wanted} got {got}")]
    ArgumentCountMismatch { wanted: usize, got: usize },

    /// A placeholder names no bindable method parameter.
    #[error("Unknown argument ':{0}', no method parameter carries that name")]
    UnknownArgument(String),

    /// A computed select item has no alias.
    #[error("Unsupported column expression [{0}], computed columns need an alias")]
    UnsupportedColumnExpression(String),

    /// Column extraction was requested on a non-select statement.
    #[error("Not a select statement")]
    NotASelectStatement,

    /// A scalar result was bound against zero, several, or `*` columns.
    #[error("When the query result is a scalar, select must name exactly one column")]
    ScalarRequiresSingleColumn,

    #[error("Unsupported * mixed with specified columns")]
    MixedStarAndColumns,

    #[error("Can't find field '{field}' in record '{record}'")]
    UnknownField { field: String, record: String },

    /// The explicit declaration kind disagrees with the subject the name reads as.
    #[error("Declared as {declared} but the method name reads as {derived}")]
    SubjectMismatch { declared: String, derived: String },

    /// The query model cannot be rendered.
    #[error("Translate error for {subject} query: {message}")]
    Translate { subject: String, message: String },

    /// A failure raised while generating one method.
    #[error("{source}, method=[{method}]{}", sql_suffix(.sql))]
    Method {
        method: String,
        sql: Option<String>,
        source: Box<MsqlError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn sql_suffix(sql: &Option<String>) -> String {
    match sql {
        Some(sql) => format!(", sql={}", sql),
        None => String::new(),
    }
}

impl MsqlError {
    /// Create a parse error for the given input text.
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a translate error for the given subject.
    pub fn translate(subject: impl ToString, message: impl Into<String>) -> Self {
        Self::Translate {
            subject: subject.to_string(),
            message: message.into(),
        }
    }

    /// Attach the method identifier (and SQL text when known) to an error.
    pub fn for_method(self, method: impl Into<String>, sql: Option<&str>) -> Self {
        Self::Method {
            method: method.into(),
            sql: sql.filter(|s| !s.is_empty()).map(str::to_string),
            source: Box::new(self),
        }
    }

    /// The underlying error with any method context peeled off.
    pub fn root(&self) -> &MsqlError {
        match self {
            Self::Method { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for msql operations.
pub type MsqlResult<T> = Result<T, MsqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MsqlError::parse("FindByAndName", "empty segment before 'And'");
        assert_eq!(
            err.to_string(),
            "Parse error in 'FindByAndName': empty segment before 'And'"
        );
    }

    #[test]
    fn test_method_context() {
        let err = MsqlError::ArgumentCountMismatch { wanted: 2, got: 1 }
            .for_method("FindById", Some("SELECT * FROM user WHERE id = :id"));
        assert_eq!(
            err.to_string(),
            "Wrong number of args, want 2 got 1, method=[FindById], sql=SELECT * FROM user WHERE id = :id"
        );
        assert!(matches!(
            err.root(),
            MsqlError::ArgumentCountMismatch { wanted: 2, got: 1 }
        ));
    }

    #[test]
    fn test_method_context_without_sql() {
        let err = MsqlError::NotASelectStatement.for_method("DeleteById", Some(""));
        assert_eq!(err.to_string(), "Not a select statement, method=[DeleteById]");
    }
}
