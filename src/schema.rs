//! Method, record and mapper descriptions.
//!
//! These are handed over by whatever discovers the data-access declarations
//! (usually as JSON) and are only read here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub ty: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Naming convention of a record's fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCase {
    /// `created_at`
    #[default]
    Snake,
    /// `createdAt`
    Camel,
    /// `CreatedAt`
    Pascal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub ty: String,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A record type rows are scanned into. Field order is declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub field_case: FieldCase,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
            field_case: FieldCase::default(),
        }
    }

    pub fn with_field_case(mut self, field_case: FieldCase) -> Self {
        self.field_case = field_case;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// First declared result of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultType {
    /// A single basic value (`bool`, `i64`, ...)
    Scalar { ty: String },
    Record(RecordSchema),
}

impl ResultType {
    pub fn scalar(ty: impl Into<String>) -> Self {
        Self::Scalar { ty: ty.into() }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar { .. })
    }
}

/// Kind of an explicit query declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    /// Excluded from generation
    None,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
            QueryKind::None => "NONE",
        };
        f.write_str(name)
    }
}

/// An explicit query declaration attached to a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDecl {
    pub kind: QueryKind,
    /// SQL template with `:name` placeholders; empty means derive from the name
    #[serde(default)]
    pub query: String,
    /// Route to the primary instead of a replica
    #[serde(default)]
    pub master: bool,
    /// Passed through unexamined
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl QueryDecl {
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            query: String::new(),
            master: false,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_master(mut self, master: bool) -> Self {
        self.master = master;
        self
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Declaration to build on. An existing one with SQL is returned as is; otherwise
    /// a fresh `kind` declaration keeps only the master flag and free-form properties.
    pub fn merge(existing: Option<&QueryDecl>, kind: QueryKind) -> QueryDecl {
        match existing {
            Some(decl) if decl.has_query() => decl.clone(),
            Some(decl) => QueryDecl {
                kind,
                query: String::new(),
                master: decl.master,
                properties: decl.properties.clone(),
            },
            None => QueryDecl::new(kind),
        }
    }
}

/// A data-access method as seen by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    pub result: ResultType,
    /// First parameter is a cancellation/deadline context
    #[serde(default)]
    pub has_context: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<QueryDecl>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, result: ResultType) -> Self {
        Self {
            name: name.into(),
            params,
            result,
            has_context: false,
            declaration: None,
        }
    }

    pub fn with_context(mut self) -> Self {
        self.has_context = true;
        self
    }

    pub fn with_declaration(mut self, declaration: QueryDecl) -> Self {
        self.declaration = Some(declaration);
        self
    }

    /// Parameters that bind to placeholders.
    pub fn bind_params(&self) -> &[Parameter] {
        match (self.has_context, self.params.split_first()) {
            (true, Some((_, rest))) => rest,
            _ => &self.params,
        }
    }

    pub fn bind_param_names(&self) -> Vec<&str> {
        self.bind_params().iter().map(|p| p.name.as_str()).collect()
    }
}

/// Table a mapper reads from, with the dialect name of its engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    /// Empty means the configured default dialect
    #[serde(default)]
    pub dialect: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>, dialect: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dialect: dialect.into(),
        }
    }
}

/// A mapper: one table and its data-access methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperDecl {
    pub name: String,
    pub table: TableRef,
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bind_params_skip_context() {
        let params = vec![Parameter::new("ctx", "Context"), Parameter::new("id", "i64")];
        let method = MethodSignature::new("FindById", params.clone(), ResultType::scalar("bool"));
        assert_eq!(method.bind_param_names(), vec!["ctx", "id"]);
        assert_eq!(method.with_context().bind_param_names(), vec!["id"]);

        let empty = MethodSignature::new("FindAll", vec![], ResultType::scalar("i64")).with_context();
        assert!(empty.bind_params().is_empty());
    }

    #[test]
    fn test_merge_short_circuits_on_sql() {
        let decl = QueryDecl::new(QueryKind::Select)
            .with_query("select * from `user` where id = :id")
            .with_master(true);
        assert_eq!(QueryDecl::merge(Some(&decl), QueryKind::Select), decl);
    }

    #[test]
    fn test_merge_carries_properties() {
        let mut decl = QueryDecl::new(QueryKind::Select).with_master(true);
        decl.properties.insert("timeout".into(), "5s".into());
        let merged = QueryDecl::merge(Some(&decl), QueryKind::Select);
        assert!(merged.master);
        assert_eq!(merged.properties.get("timeout").map(String::as_str), Some("5s"));
        assert!(!merged.has_query());

        assert_eq!(
            QueryDecl::merge(None, QueryKind::Delete),
            QueryDecl::new(QueryKind::Delete)
        );
    }

    #[test]
    fn test_method_from_json() {
        let json = r#"{
            "name": "FindById2",
            "params": [{"name": "ctx"}, {"name": "id", "ty": "i64"}],
            "has_context": true,
            "result": {
                "kind": "record",
                "name": "User",
                "fields": [{"name": "id", "ty": "i64"}, {"name": "name", "ty": "String"}]
            },
            "declaration": {"kind": "select", "query": "select * from `user` where id = :id", "master": true}
        }"#;
        let method: MethodSignature = serde_json::from_str(json).unwrap();
        assert_eq!(method.bind_param_names(), vec!["id"]);
        let ResultType::Record(record) = &method.result else {
            panic!("expected record result");
        };
        assert_eq!(record.field_case, FieldCase::Snake);
        assert_eq!(record.fields.len(), 2);
        let decl = method.declaration.unwrap();
        assert_eq!(decl.kind, QueryKind::Select);
        assert!(decl.master);
    }

    #[test]
    fn test_scalar_result_from_json() {
        let result: ResultType = serde_json::from_str(r#"{"kind": "scalar", "ty": "bool"}"#).unwrap();
        assert_eq!(result, ResultType::scalar("bool"));
        assert!(result.is_scalar());
    }
}
