//! Result and argument binding.
//!
//! Maps projected columns onto the fields of the method's result record, and
//! placeholder names onto the method's parameters.

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

use crate::error::{MsqlError, MsqlResult};
use crate::schema::{FieldCase, Parameter, RecordSchema, ResultType};
use crate::statement::Column;

/// Where one projected column is scanned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanTarget {
    /// The scan item itself
    Scalar,
    /// A named field of the scan item
    Field(String),
}

/// Scan targets in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTargets(Vec<ScanTarget>);

impl ScanTargets {
    pub fn targets(&self) -> &[ScanTarget] {
        &self.0
    }

    /// `&mut item.id, &mut item.name`, or `&mut item` for a scalar.
    pub fn render(&self, item: &str) -> String {
        self.0
            .iter()
            .map(|target| match target {
                ScanTarget::Scalar => format!("&mut {}", item),
                ScanTarget::Field(field) => format!("&mut {}.{}", item, field),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Bind projected columns to the result type.
pub fn bind(result: &ResultType, columns: &[Column]) -> MsqlResult<ScanTargets> {
    match result {
        ResultType::Scalar { .. } => match columns {
            [column] if !column.is_star() => Ok(ScanTargets(vec![ScanTarget::Scalar])),
            _ => Err(MsqlError::ScalarRequiresSingleColumn),
        },
        ResultType::Record(record) => match columns {
            [column] if column.is_star() => Ok(ScanTargets(
                record
                    .fields
                    .iter()
                    .map(|f| ScanTarget::Field(f.name.clone()))
                    .collect(),
            )),
            _ => columns
                .iter()
                .map(|column| bind_column(record, column))
                .collect::<MsqlResult<Vec<_>>>()
                .map(ScanTargets),
        },
    }
}

fn bind_column(record: &RecordSchema, column: &Column) -> MsqlResult<ScanTarget> {
    if column.is_star() {
        return Err(MsqlError::MixedStarAndColumns);
    }

    let wanted = field_name(&column.alias, record.field_case);
    if let Some(field) = record.field(&wanted) {
        return Ok(ScanTarget::Field(field.name.clone()));
    }

    // Fall back to comparing snake forms so `userID` still finds `user_id`.
    let snake = column.alias.to_case(Case::Snake);
    record
        .fields
        .iter()
        .find(|f| f.name.to_case(Case::Snake) == snake)
        .map(|f| ScanTarget::Field(f.name.clone()))
        .ok_or_else(|| MsqlError::UnknownField {
            field: wanted,
            record: record.name.clone(),
        })
}

/// Convert a column alias to the record's field naming convention.
pub fn field_name(alias: &str, case: FieldCase) -> String {
    match case {
        FieldCase::Snake => alias.to_case(Case::Snake),
        FieldCase::Camel => alias.to_case(Case::Camel),
        FieldCase::Pascal => alias.to_case(Case::UpperCamel),
    }
}

/// Values passed to the driver, in bind order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentList {
    pub names: Vec<String>,
    /// No named placeholders; parameters bind in declaration order
    pub positional: bool,
}

impl ArgumentList {
    pub fn render(&self) -> String {
        self.names.join(", ")
    }
}

/// Bind placeholder names to the method's bindable parameters.
pub fn bind_arguments<S: AsRef<str>>(
    placeholders: &[S],
    params: &[Parameter],
) -> MsqlResult<ArgumentList> {
    if placeholders.is_empty() {
        return Ok(ArgumentList {
            names: params.iter().map(|p| p.name.clone()).collect(),
            positional: true,
        });
    }

    if placeholders.len() != params.len() {
        return Err(MsqlError::ArgumentCountMismatch {
            wanted: placeholders.len(),
            got: params.len(),
        });
    }

    let names = placeholders
        .iter()
        .map(|name| {
            let name = name.as_ref();
            // `:user.name` binds through the `user` parameter
            let root = name.split('.').next().unwrap_or(name);
            if params.iter().any(|p| p.name == root) {
                Ok(name.to_string())
            } else {
                Err(MsqlError::UnknownArgument(name.to_string()))
            }
        })
        .collect::<MsqlResult<Vec<_>>>()?;

    Ok(ArgumentList {
        names,
        positional: false,
    })
}
