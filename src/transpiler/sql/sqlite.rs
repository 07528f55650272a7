use crate::transpiler::traits::{escape_identifier, SqlGenerator};

/// SQLite Generator.
pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier(name)
    }
}
