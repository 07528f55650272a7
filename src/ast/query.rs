use serde::{Deserialize, Serialize};

use crate::ast::{FilterGroup, Subject};
use crate::error::MsqlResult;

/// Target table of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A structured query intent: what to do, where, and under which filter.
///
/// Values are immutable; the `with_*` methods return a new query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    subject: Subject,
    #[serde(default)]
    table: Option<Table>,
    #[serde(default)]
    filter_group: Option<FilterGroup>,
}

impl Query {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            table: None,
            filter_group: None,
        }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn filter_group(&self) -> Option<&FilterGroup> {
        self.filter_group.as_ref()
    }

    pub fn with_table(self, table: Table) -> Self {
        Self {
            table: Some(table),
            ..self
        }
    }

    pub fn with_filter_group(self, group: FilterGroup) -> Self {
        Self {
            filter_group: Some(group),
            ..self
        }
    }

    /// Fill the filter group's argument names; a query without filter is returned as is.
    pub fn fill_named_args<S: AsRef<str>>(self, names: &[S]) -> MsqlResult<Self> {
        match &self.filter_group {
            Some(group) => {
                let filled = group.fill_named_args(names)?;
                Ok(self.with_filter_group(filled))
            }
            None => Ok(self),
        }
    }
}
