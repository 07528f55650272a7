use msql::prelude::*;
use pretty_assertions::assert_eq;

const USER_MAPPER: &str = include_str!("fixtures/user_mapper.json");

fn mapper() -> MapperDecl {
    serde_json::from_str(USER_MAPPER).expect("fixture should deserialize")
}

fn plan_of<'a>(plan: &'a MapperPlan, method: &str) -> Option<&'a MethodPlan> {
    plan.methods
        .iter()
        .find(|m| m.method == method)
        .unwrap_or_else(|| panic!("no method {}", method))
        .plan
        .as_ref()
        .unwrap_or_else(|e| panic!("{} failed: {}", method, e))
        .as_ref()
}

fn select<'a>(plan: &'a MapperPlan, method: &str) -> &'a SelectPlan {
    match plan_of(plan, method) {
        Some(MethodPlan::Select(select)) => select,
        other => panic!("{} is not a select plan: {:?}", method, other),
    }
}

fn delete<'a>(plan: &'a MapperPlan, method: &str) -> &'a DeletePlan {
    match plan_of(plan, method) {
        Some(MethodPlan::Delete(delete)) => delete,
        other => panic!("{} is not a delete plan: {:?}", method, other),
    }
}

const USER_COLUMNS: &str = "`id`, `name`, `gender`, `birthday`, `created_at`";
const USER_SCAN: &str =
    "&mut item.id, &mut item.name, &mut item.gender, &mut item.birthday, &mut item.created_at";

#[test]
fn test_every_method_plans() {
    let plan = Generator::default().plan_mapper(&mapper());
    assert_eq!(plan.mapper, "UserDao");
    assert_eq!(plan.table, "user");
    assert_eq!(plan.methods.len(), 12);
    let failures: Vec<String> = plan.failures().map(|(m, e)| format!("{}: {}", m, e)).collect();
    assert_eq!(failures, Vec::<String>::new());
}

#[test]
fn test_derived_find() {
    let plan = Generator::default().plan_mapper(&mapper());

    let find = select(&plan, "FindById");
    assert_eq!(
        find.sql,
        format!("SELECT {} FROM `user` WHERE `id` = ?", USER_COLUMNS)
    );
    assert_eq!(find.args.render(), "id");
    assert_eq!(find.scan.render("item"), USER_SCAN);
    assert!(!find.master);

    let range = select(&plan, "FindByBirthdayGTE");
    assert_eq!(
        range.sql,
        format!("SELECT {} FROM `user` WHERE `birthday` >= ?", USER_COLUMNS)
    );
    assert_eq!(range.args.render(), "time");
}

#[test]
fn test_derived_scalars() {
    let plan = Generator::default().plan_mapper(&mapper());

    let exists = select(&plan, "ExistsById");
    assert_eq!(exists.sql, "SELECT 1 AS found FROM `user` WHERE `id` = ? LIMIT 1");
    assert_eq!(exists.scan.render("item"), "&mut item");

    let count = select(&plan, "CountByBirthdayGTE");
    assert_eq!(
        count.sql,
        "SELECT COUNT(*) AS count FROM `user` WHERE `birthday` >= ?"
    );
    assert_eq!(count.args.render(), "time");
    assert_eq!(count.scan.targets(), &[ScanTarget::Scalar]);
}

#[test]
fn test_explicit_selects() {
    let plan = Generator::default().plan_mapper(&mapper());

    let find = select(&plan, "FindById2");
    assert_eq!(
        find.sql,
        format!("SELECT {} FROM `user` WHERE id = ?", USER_COLUMNS)
    );
    assert!(find.master);
    assert_eq!(find.scan.render("item"), USER_SCAN);

    let range = select(&plan, "FindByBirthdayGTE2");
    assert_eq!(
        range.sql,
        format!("SELECT {} FROM `user` WHERE birthday >= ?", USER_COLUMNS)
    );

    let exists = select(&plan, "ExistsById2");
    assert_eq!(exists.sql, "select 1 as X from `user` WHERE id = ? limit 1");
    assert_eq!(exists.scan.targets(), &[ScanTarget::Scalar]);

    let count = select(&plan, "CountByBirthdayGTE2");
    assert_eq!(
        count.sql,
        "select count(*) as count from `user` where birthday >= ?"
    );
    assert_eq!(count.args.render(), "time");
}

#[test]
fn test_excluded_methods() {
    let plan = Generator::default().plan_mapper(&mapper());
    assert!(plan_of(&plan, "Insert").is_none());
    assert!(plan_of(&plan, "UpdateById").is_none());
}

#[test]
fn test_deletes() {
    let plan = Generator::default().plan_mapper(&mapper());

    let derived = delete(&plan, "DeleteById");
    assert_eq!(derived.sql, "DELETE FROM `user` WHERE `id` = ?");
    assert_eq!(derived.args.render(), "id");

    let explicit = delete(&plan, "DeleteById2");
    assert_eq!(explicit.sql, "delete from `user` where id = ?");
    assert_eq!(explicit.args.names, vec!["id"]);
}

#[test]
fn test_postgres_mapper() {
    let mut mapper = mapper();
    mapper.table = TableRef::new("users", "PostgreSQL");
    let plan = Generator::default().plan_mapper(&mapper);

    let find = select(&plan, "FindById");
    assert_eq!(
        find.sql,
        "SELECT \"id\", \"name\", \"gender\", \"birthday\", \"created_at\" FROM \"users\" WHERE \"id\" = $1"
    );
    let exists = select(&plan, "ExistsById");
    assert_eq!(exists.sql, "SELECT 1 AS found FROM \"users\" WHERE \"id\" = $1 LIMIT 1");
}

#[test]
fn test_unsupported_dialect_fails_every_method() {
    let mut mapper = mapper();
    mapper.table = TableRef::new("user", "oracle");
    let plan = Generator::default().plan_mapper(&mapper);

    // None-tagged methods never reach the dialect
    assert_eq!(plan.failures().count(), 10);
    for (_, err) in plan.failures() {
        assert!(matches!(err.root(), MsqlError::UnsupportedDialect(d) if d == "oracle"));
    }
}

#[test]
fn test_failures_are_isolated() {
    let mut mapper = mapper();
    mapper.methods.push(
        MethodSignature::new(
            "FindByNameAndAge",
            vec![Parameter::new("name", "String")],
            ResultType::scalar("i64"),
        ),
    );
    let plan = Generator::default().plan_mapper(&mapper);
    let failures: Vec<(&str, String)> = plan
        .failures()
        .map(|(m, e)| (m, e.to_string()))
        .collect();
    assert_eq!(
        failures,
        vec![(
            "FindByNameAndAge",
            "Wrong number of named args, want 2 got 1, method=[FindByNameAndAge]".to_string()
        )]
    );
    assert!(select(&plan, "FindById").sql.starts_with("SELECT `id`"));
}

#[test]
fn test_plan_serializes() {
    let plan = Generator::default().plan_mapper(&mapper());
    let json = serde_json::to_value(plan_of(&plan, "DeleteById")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "delete",
            "method": "DeleteById",
            "sql": "DELETE FROM `user` WHERE `id` = ?",
            "args": { "names": ["id"], "positional": false }
        })
    );
}
