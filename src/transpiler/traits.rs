/// Per-dialect rendering rules used by the query translator.
pub trait SqlGenerator {
    /// Quote a table or column identifier.
    fn quote_identifier(&self, name: &str) -> String;

    /// Clause bounding a result to a single row, with leading space.
    fn limit_one(&self) -> &'static str {
        " LIMIT 1"
    }
}

/// ANSI double-quote escaping shared by the dialects that use it.
pub fn escape_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
