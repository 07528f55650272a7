use crate::transpiler::traits::{escape_identifier, SqlGenerator};

/// PostgreSQL Generator.
pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier(name)
    }
}
