use serde::{Deserialize, Serialize};

use crate::ast::{Connective, Operator};
use crate::error::{MsqlError, MsqlResult};

/// A single comparison against one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    /// Field as written in the method name (`Birthday`, `createdAt`, `created_at`)
    pub field: String,
    /// Comparison operator
    pub op: Operator,
    /// Bound argument names, empty until filled
    #[serde(default)]
    pub args: Vec<String>,
}

impl FilterPredicate {
    pub fn new(field: impl Into<String>, op: Operator) -> Self {
        Self {
            field: field.into(),
            op,
            args: Vec::new(),
        }
    }

    /// Whether every argument slot of the operator carries a name.
    pub fn is_filled(&self) -> bool {
        self.args.len() == self.op.arity()
    }
}

/// A predicate or a parenthesized sub-group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterNode {
    Predicate(FilterPredicate),
    Group(FilterGroup),
}

impl From<FilterPredicate> for FilterNode {
    fn from(predicate: FilterPredicate) -> Self {
        FilterNode::Predicate(predicate)
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        FilterNode::Group(group)
    }
}

/// Ordered nodes joined left to right by connectives.
///
/// `connectives[i]` sits between `nodes[i]` and `nodes[i + 1]`, so a group
/// always has exactly one connective fewer than nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FilterGroupParts")]
pub struct FilterGroup {
    nodes: Vec<FilterNode>,
    connectives: Vec<Connective>,
}

/// Unchecked wire form of a [`FilterGroup`].
#[derive(Deserialize)]
struct FilterGroupParts {
    nodes: Vec<FilterNode>,
    #[serde(default)]
    connectives: Vec<Connective>,
}

impl TryFrom<FilterGroupParts> for FilterGroup {
    type Error = MsqlError;

    fn try_from(parts: FilterGroupParts) -> MsqlResult<Self> {
        if parts.nodes.is_empty() || parts.connectives.len() + 1 != parts.nodes.len() {
            return Err(MsqlError::parse(
                "filter group",
                format!(
                    "{} node(s) joined by {} connective(s)",
                    parts.nodes.len(),
                    parts.connectives.len()
                ),
            ));
        }
        Ok(Self {
            nodes: parts.nodes,
            connectives: parts.connectives,
        })
    }
}

impl FilterGroup {
    /// Start a group with its first node.
    pub fn new(first: impl Into<FilterNode>) -> Self {
        Self {
            nodes: vec![first.into()],
            connectives: Vec::new(),
        }
    }

    /// Append a node joined by `connective`.
    pub fn push(mut self, connective: Connective, node: impl Into<FilterNode>) -> Self {
        self.connectives.push(connective);
        self.nodes.push(node.into());
        self
    }

    pub fn and(self, node: impl Into<FilterNode>) -> Self {
        self.push(Connective::And, node)
    }

    pub fn or(self, node: impl Into<FilterNode>) -> Self {
        self.push(Connective::Or, node)
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn connectives(&self) -> &[Connective] {
        &self.connectives
    }

    /// All predicates in textual order, descending into sub-groups.
    pub fn predicates(&self) -> Vec<&FilterPredicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a FilterPredicate>) {
        for node in &self.nodes {
            match node {
                FilterNode::Predicate(p) => out.push(p),
                FilterNode::Group(g) => g.collect_predicates(out),
            }
        }
    }

    /// Number of argument names the group consumes.
    pub fn required_args(&self) -> usize {
        self.predicates().iter().map(|p| p.op.arity()).sum()
    }

    /// Assign argument names to the predicates in discovery order.
    ///
    /// Returns a new group; the count of `names` must equal [`required_args`](Self::required_args).
    pub fn fill_named_args<S: AsRef<str>>(&self, names: &[S]) -> MsqlResult<FilterGroup> {
        let wanted = self.required_args();
        if names.len() != wanted {
            return Err(MsqlError::ArgumentArityMismatch {
                wanted,
                got: names.len(),
            });
        }
        let mut remaining = names.iter().map(|n| n.as_ref().to_string());
        Ok(self.fill_from(&mut remaining))
    }

    fn fill_from(&self, names: &mut impl Iterator<Item = String>) -> FilterGroup {
        let nodes = self
            .nodes
            .iter()
            .map(|node| match node {
                FilterNode::Predicate(p) => {
                    let args = names.by_ref().take(p.op.arity()).collect();
                    FilterNode::Predicate(FilterPredicate { args, ..p.clone() })
                }
                FilterNode::Group(g) => FilterNode::Group(g.fill_from(&mut *names)),
            })
            .collect();
        FilterGroup {
            nodes,
            connectives: self.connectives.clone(),
        }
    }
}
