use crate::transpiler::traits::SqlGenerator;

/// MySQL Generator.
pub struct MysqlGenerator;

impl SqlGenerator for MysqlGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }
}
