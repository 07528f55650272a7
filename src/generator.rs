//! Per-method SQL generation.
//!
//! The [`Generator`] composes the convention parser, the translator, the
//! statement parser, the named-parameter compiler and the binder for one
//! method at a time. Every failure is wrapped with the method identifier (and
//! the SQL text when one exists) before it leaves this module.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::ast::{Subject, Table};
use crate::binder::{self, ArgumentList, ScanTargets};
use crate::config::GeneratorConfig;
use crate::convention;
use crate::dialect::Dialect;
use crate::error::{MsqlError, MsqlResult};
use crate::named::compile_named_query;
use crate::schema::{MapperDecl, MethodSignature, QueryDecl, QueryKind, ResultType, TableRef};
use crate::statement::Statement;
use crate::transpiler::{column_name, Translator};

/// Generated glue for a select-like method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectPlan {
    pub method: String,
    /// Positional SQL, wildcard expanded
    pub sql: String,
    pub args: ArgumentList,
    pub scan: ScanTargets,
    pub master: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Generated glue for a delete-like method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletePlan {
    pub method: String,
    pub sql: String,
    pub args: ArgumentList,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MethodPlan {
    Select(SelectPlan),
    Delete(DeletePlan),
}

impl MethodPlan {
    pub fn method(&self) -> &str {
        match self {
            MethodPlan::Select(plan) => &plan.method,
            MethodPlan::Delete(plan) => &plan.method,
        }
    }

    pub fn sql(&self) -> &str {
        match self {
            MethodPlan::Select(plan) => &plan.sql,
            MethodPlan::Delete(plan) => &plan.sql,
        }
    }

    pub fn args(&self) -> &ArgumentList {
        match self {
            MethodPlan::Select(plan) => &plan.args,
            MethodPlan::Delete(plan) => &plan.args,
        }
    }
}

/// Outcome for one method of a mapper. `Ok(None)` means nothing is generated.
#[derive(Debug)]
pub struct MethodResult {
    pub method: String,
    pub plan: MsqlResult<Option<MethodPlan>>,
}

#[derive(Debug)]
pub struct MapperPlan {
    pub mapper: String,
    pub table: String,
    pub methods: Vec<MethodResult>,
}

impl MapperPlan {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &MsqlError)> {
        self.methods.iter().filter_map(|m| match &m.plan {
            Err(e) => Some((m.method.as_str(), e)),
            Ok(_) => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Derives SQL and binding glue for data-access methods.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Dialect of `table`, falling back to the configured default when it names none.
    pub fn dialect(&self, table: &TableRef) -> MsqlResult<Dialect> {
        if table.dialect.trim().is_empty() {
            self.config.default_dialect()
        } else {
            Dialect::from_name(&table.dialect)
        }
    }

    /// Kind of SQL the method runs: its explicit tag, else what its name reads as.
    pub fn query_type(&self, method: &MethodSignature) -> MsqlResult<QueryKind> {
        if let Some(decl) = &method.declaration {
            return Ok(decl.kind);
        }
        let subject = convention::parse_subject(&method.name)
            .map_err(|e| e.for_method(&method.name, None))?;
        Ok(kind_of(subject))
    }

    /// Select declaration for the method, deriving its SQL from the name when needed.
    ///
    /// `None` when the method is tagged with another kind, or is untagged and its
    /// name does not read as a select.
    pub fn select_declaration(
        &self,
        method: &MethodSignature,
        table: &TableRef,
    ) -> MsqlResult<Option<QueryDecl>> {
        self.declaration(method, table, QueryKind::Select)
            .map_err(|e| e.for_method(&method.name, None))
    }

    /// Delete counterpart of [`select_declaration`](Self::select_declaration).
    pub fn delete_declaration(
        &self,
        method: &MethodSignature,
        table: &TableRef,
    ) -> MsqlResult<Option<QueryDecl>> {
        self.declaration(method, table, QueryKind::Delete)
            .map_err(|e| e.for_method(&method.name, None))
    }

    fn declaration(
        &self,
        method: &MethodSignature,
        table: &TableRef,
        kind: QueryKind,
    ) -> MsqlResult<Option<QueryDecl>> {
        let tagged = method.declaration.as_ref();
        if tagged.is_some_and(|decl| decl.kind != kind) {
            return Ok(None);
        }

        let decl = QueryDecl::merge(tagged, kind);
        if decl.has_query() {
            return Ok(Some(decl));
        }

        let query = match convention::parse(&method.name)? {
            Some(query) if kind_of(query.subject()) == kind => query,
            Some(query) if tagged.is_some() => {
                return Err(MsqlError::SubjectMismatch {
                    declared: kind.to_string(),
                    derived: query.subject().to_string(),
                });
            }
            Some(_) => return Ok(None),
            None if tagged.is_some() => {
                return Err(MsqlError::parse(
                    &method.name,
                    "no query can be derived from the method name",
                ));
            }
            None => return Ok(None),
        };

        let query = query
            .with_table(Table::new(&table.name))
            .fill_named_args(method.bind_param_names().as_slice())?;
        let sql = Translator::for_dialect(self.dialect(table)?).translate(&query)?;
        tracing::debug!("derived {} for {}: {}", kind, method.name, sql);

        Ok(Some(QueryDecl { query: sql, ..decl }))
    }

    /// Positional SQL for a select, with a sole `*` expanded to the record's columns.
    pub fn rewrite_select_statement(
        &self,
        method: &MethodSignature,
        table: &TableRef,
        decl: &QueryDecl,
    ) -> MsqlResult<String> {
        self.rewrite_select(method, table, decl)
            .map_err(|e| e.for_method(&method.name, Some(&decl.query)))
    }

    fn rewrite_select(
        &self,
        method: &MethodSignature,
        table: &TableRef,
        decl: &QueryDecl,
    ) -> MsqlResult<String> {
        let dialect = self.dialect(table)?;
        let bound = compile_named_query(&decl.query, dialect)?;
        let statement = Statement::parse(dialect, &bound.sql)?;
        let columns = statement.select_columns()?;

        match columns.as_slice() {
            [column] if column.is_star() => match &method.result {
                ResultType::Scalar { .. } => Err(MsqlError::ScalarRequiresSingleColumn),
                ResultType::Record(record) => {
                    let names: Vec<String> =
                        record.fields.iter().map(|f| column_name(&f.name)).collect();
                    statement.expand_wildcard(names.as_slice())
                }
            },
            _ => Ok(bound.sql),
        }
    }

    /// Positional SQL for a delete.
    pub fn rewrite_delete_statement(
        &self,
        method: &MethodSignature,
        table: &TableRef,
        decl: &QueryDecl,
    ) -> MsqlResult<String> {
        self.dialect(table)
            .and_then(|dialect| compile_named_query(&decl.query, dialect))
            .map(|bound| bound.sql)
            .map_err(|e| e.for_method(&method.name, Some(&decl.query)))
    }

    /// Scan targets for the projected columns of `sql`.
    pub fn scan_targets(
        &self,
        method: &MethodSignature,
        table: &TableRef,
        sql: &str,
    ) -> MsqlResult<ScanTargets> {
        self.dialect(table)
            .and_then(|dialect| Statement::parse(dialect, sql))
            .and_then(|statement| statement.select_columns())
            .and_then(|columns| binder::bind(&method.result, &columns))
            .map_err(|e| e.for_method(&method.name, Some(sql)))
    }

    /// Arguments to pass to the driver, in bind order.
    pub fn query_args(
        &self,
        method: &MethodSignature,
        table: &TableRef,
        decl: &QueryDecl,
    ) -> MsqlResult<ArgumentList> {
        self.dialect(table)
            .and_then(|dialect| compile_named_query(&decl.query, dialect))
            .and_then(|bound| binder::bind_arguments(bound.names.as_slice(), method.bind_params()))
            .map_err(|e| e.for_method(&method.name, Some(&decl.query)))
    }

    /// Everything needed to generate one method. `None` for insert, update and
    /// untagged-but-excluded methods.
    pub fn plan_method(
        &self,
        method: &MethodSignature,
        table: &TableRef,
    ) -> MsqlResult<Option<MethodPlan>> {
        let plan = match self.query_type(method)? {
            QueryKind::Select => {
                let Some(decl) = self.select_declaration(method, table)? else {
                    return Ok(None);
                };
                let sql = self.rewrite_select_statement(method, table, &decl)?;
                let scan = self.scan_targets(method, table, &sql)?;
                let args = self.query_args(method, table, &decl)?;
                MethodPlan::Select(SelectPlan {
                    method: method.name.clone(),
                    sql,
                    args,
                    scan,
                    master: decl.master,
                    properties: decl.properties,
                })
            }
            QueryKind::Delete => {
                let Some(decl) = self.delete_declaration(method, table)? else {
                    return Ok(None);
                };
                let sql = self.rewrite_delete_statement(method, table, &decl)?;
                let args = self.query_args(method, table, &decl)?;
                MethodPlan::Delete(DeletePlan {
                    method: method.name.clone(),
                    sql,
                    args,
                    properties: decl.properties,
                })
            }
            QueryKind::Insert | QueryKind::Update | QueryKind::None => {
                tracing::debug!("skipping {}", method.name);
                return Ok(None);
            }
        };

        tracing::debug!("planned {}: {}", plan.method(), plan.sql());
        Ok(Some(plan))
    }

    /// Plan every method of a mapper. A failing method never stops its siblings.
    pub fn plan_mapper(&self, mapper: &MapperDecl) -> MapperPlan {
        let methods = mapper
            .methods
            .iter()
            .map(|method| {
                let plan = self.plan_method(method, &mapper.table);
                if let Err(e) = &plan {
                    tracing::warn!("{}: {}", mapper.name, e);
                }
                MethodResult {
                    method: method.name.clone(),
                    plan,
                }
            })
            .collect();

        MapperPlan {
            mapper: mapper.name.clone(),
            table: mapper.table.name.clone(),
            methods,
        }
    }
}

fn kind_of(subject: Subject) -> QueryKind {
    if subject.is_select() {
        QueryKind::Select
    } else {
        QueryKind::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::ScanTarget;
    use crate::schema::{FieldDef, Parameter, RecordSchema};
    use pretty_assertions::assert_eq;

    fn table() -> TableRef {
        TableRef::new("user", "mysql")
    }

    fn user() -> ResultType {
        ResultType::Record(RecordSchema::new(
            "User",
            vec![
                FieldDef::new("id", "i64"),
                FieldDef::new("name", "String"),
                FieldDef::new("created_at", "NaiveDateTime"),
            ],
        ))
    }

    fn method(name: &str, params: &[&str], result: ResultType) -> MethodSignature {
        let mut all = vec![Parameter::new("ctx", "Context")];
        all.extend(params.iter().map(|p| Parameter::new(*p, "")));
        MethodSignature::new(name, all, result).with_context()
    }

    fn select(query: &str) -> QueryDecl {
        QueryDecl::new(QueryKind::Select).with_query(query)
    }

    #[test]
    fn test_dialect_falls_back_to_config() {
        let generator = Generator::new(GeneratorConfig {
            default_dialect: "sqlite".into(),
            ..Default::default()
        });
        assert_eq!(generator.dialect(&TableRef::new("user", "")).unwrap(), Dialect::Sqlite);
        assert_eq!(generator.dialect(&table()).unwrap(), Dialect::MySql);
        assert!(matches!(
            generator.dialect(&TableRef::new("user", "oracle")).unwrap_err(),
            MsqlError::UnsupportedDialect(_)
        ));
    }

    #[test]
    fn test_query_type() {
        let generator = Generator::default();
        let cases = [
            ("FindById", QueryKind::Select),
            ("CountByBirthdayGTE", QueryKind::Select),
            ("ExistsById", QueryKind::Select),
            ("DeleteById", QueryKind::Delete),
        ];
        for (name, kind) in cases {
            let m = method(name, &["id"], ResultType::scalar("i64"));
            assert_eq!(generator.query_type(&m).unwrap(), kind, "{}", name);
        }

        let insert = method("Insert", &["user"], user())
            .with_declaration(QueryDecl::new(QueryKind::None));
        assert_eq!(generator.query_type(&insert).unwrap(), QueryKind::None);

        let untagged = method("Insert", &["user"], user());
        let err = generator.query_type(&untagged).unwrap_err();
        assert!(matches!(err.root(), MsqlError::UnrecognizedSubject(_)));
    }

    #[test]
    fn test_select_declaration_derives_sql() {
        let generator = Generator::default();
        let m = method("FindByBirthdayGTE", &["time"], user());
        let decl = generator.select_declaration(&m, &table()).unwrap().unwrap();
        assert_eq!(decl.kind, QueryKind::Select);
        assert_eq!(decl.query, "SELECT * FROM `user` WHERE `birthday` >= :time");
    }

    #[test]
    fn test_explicit_sql_short_circuits() {
        let generator = Generator::default();
        let decl = select("select * from `user` where id = :id").with_master(true);
        let m = method("FindById2", &["id"], user()).with_declaration(decl.clone());
        assert_eq!(generator.select_declaration(&m, &table()).unwrap(), Some(decl));
    }

    #[test]
    fn test_tagged_without_sql_keeps_master() {
        let generator = Generator::default();
        let m = method("FindById", &["id"], user())
            .with_declaration(QueryDecl::new(QueryKind::Select).with_master(true));
        let decl = generator.select_declaration(&m, &table()).unwrap().unwrap();
        assert!(decl.master);
        assert_eq!(decl.query, "SELECT * FROM `user` WHERE `id` = :id");
    }

    #[test]
    fn test_declaration_of_other_kind_is_none() {
        let generator = Generator::default();
        let m = method("DeleteById", &["id"], ResultType::scalar("i64"));
        assert_eq!(generator.select_declaration(&m, &table()).unwrap(), None);
        assert!(generator.delete_declaration(&m, &table()).unwrap().is_some());

        let tagged = method("FindById", &["id"], user())
            .with_declaration(select("select * from user where id = :id"));
        assert_eq!(generator.delete_declaration(&tagged, &table()).unwrap(), None);
    }

    #[test]
    fn test_subject_mismatch() {
        let generator = Generator::default();
        let m = method("DeleteById", &["id"], user())
            .with_declaration(QueryDecl::new(QueryKind::Select));
        let err = generator.select_declaration(&m, &table()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Declared as SELECT but the method name reads as DELETE, method=[DeleteById]"
        );
    }

    #[test]
    fn test_tagged_but_underivable() {
        let generator = Generator::default();
        let m = method("LoadEverything", &[], user())
            .with_declaration(QueryDecl::new(QueryKind::Select));
        let err = generator.select_declaration(&m, &table()).unwrap_err();
        assert!(matches!(err.root(), MsqlError::Parse { input, .. } if input == "LoadEverything"));
    }

    #[test]
    fn test_arity_mismatch_names_method() {
        let generator = Generator::default();
        let m = method("FindByNameAndAge", &["name"], user());
        let err = generator.select_declaration(&m, &table()).unwrap_err();
        assert!(matches!(
            err.root(),
            MsqlError::ArgumentArityMismatch { wanted: 2, got: 1 }
        ));
        assert!(err.to_string().ends_with("method=[FindByNameAndAge]"));
    }

    #[test]
    fn test_rewrite_expands_star() {
        let generator = Generator::default();
        let m = method("FindById2", &["id"], user());
        let sql = generator
            .rewrite_select_statement(&m, &table(), &select("select * from `user` where id = :id"))
            .unwrap();
        assert_eq!(sql, "SELECT `id`, `name`, `created_at` FROM `user` WHERE id = ?");
    }

    #[test]
    fn test_rewrite_keeps_explicit_columns() {
        let generator = Generator::default();
        let m = method("ExistsById2", &["id"], ResultType::scalar("bool"));
        let sql = generator
            .rewrite_select_statement(
                &m,
                &table(),
                &select("select 1 as X from `user` WHERE id = :id limit 1"),
            )
            .unwrap();
        assert_eq!(sql, "select 1 as X from `user` WHERE id = ? limit 1");
    }

    #[test]
    fn test_rewrite_scalar_star_fails() {
        let generator = Generator::default();
        let m = method("CountAll", &[], ResultType::scalar("i64"));
        let err = generator
            .rewrite_select_statement(&m, &table(), &select("select * from user"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "When the query result is a scalar, select must name exactly one column, \
             method=[CountAll], sql=select * from user"
        );
    }

    #[test]
    fn test_rewrite_postgres_placeholders() {
        let generator = Generator::default();
        let m = method("FindByNameAndAge", &["name", "age"], user());
        let sql = generator
            .rewrite_select_statement(
                &m,
                &TableRef::new("users", "postgres"),
                &select("SELECT * FROM users WHERE name = :name AND age > :age"),
            )
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"id\", \"name\", \"created_at\" FROM users WHERE name = $1 AND age > $2"
        );
    }

    #[test]
    fn test_rewrite_delete_statement() {
        let generator = Generator::default();
        let m = method("DeleteById2", &["id"], ResultType::scalar("i64"));
        let decl = QueryDecl::new(QueryKind::Delete).with_query("delete from `user` where id = :id");
        assert_eq!(
            generator.rewrite_delete_statement(&m, &table(), &decl).unwrap(),
            "delete from `user` where id = ?"
        );
    }

    #[test]
    fn test_scan_targets() {
        let generator = Generator::default();
        let m = method("FindById", &["id"], user());
        let scan = generator
            .scan_targets(&m, &table(), "SELECT name, created_at AS createdAt FROM user")
            .unwrap();
        assert_eq!(scan.render("item"), "&mut item.name, &mut item.created_at");

        let exists = method("ExistsById", &["id"], ResultType::scalar("bool"));
        let scan = generator
            .scan_targets(&exists, &table(), "SELECT 1 AS found FROM `user` WHERE `id` = ? LIMIT 1")
            .unwrap();
        assert_eq!(scan.targets(), &[ScanTarget::Scalar]);
    }

    #[test]
    fn test_query_args() {
        let generator = Generator::default();
        let m = method("FindByNameOrAge", &["age", "name"], user());
        let args = generator
            .query_args(&m, &table(), &select("SELECT * FROM user WHERE name = :name OR age = :age"))
            .unwrap();
        assert_eq!(args.render(), "name, age");

        let positional = generator
            .query_args(&m, &table(), &select("SELECT * FROM user WHERE name = ? OR age = ?"))
            .unwrap();
        assert!(positional.positional);
        assert_eq!(positional.render(), "age, name");

        let short = method("FindById", &[], user());
        let err = generator
            .query_args(&short, &table(), &select("SELECT * FROM user WHERE id = :id"))
            .unwrap_err();
        assert!(matches!(
            err.root(),
            MsqlError::ArgumentCountMismatch { wanted: 1, got: 0 }
        ));
    }

    #[test]
    fn test_plan_skips_excluded_methods() {
        let generator = Generator::default();
        for kind in [QueryKind::Insert, QueryKind::Update, QueryKind::None] {
            let m = method("UpdateById", &["id", "user"], ResultType::scalar("i64"))
                .with_declaration(QueryDecl::new(kind));
            assert_eq!(generator.plan_method(&m, &table()).unwrap(), None);
        }
    }

    #[test]
    fn test_plan_mapper_isolates_failures() {
        let generator = Generator::default();
        let mapper = MapperDecl {
            name: "UserDao".into(),
            table: table(),
            methods: vec![
                method("FindByAndName", &["name"], user()),
                method("FindById", &["id"], user()),
            ],
        };
        let plan = generator.plan_mapper(&mapper);
        assert!(plan.has_failures());
        let failures: Vec<&str> = plan.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["FindByAndName"]);

        let found = plan.methods[1].plan.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(
            found.sql(),
            "SELECT `id`, `name`, `created_at` FROM `user` WHERE `id` = ?"
        );
    }
}
