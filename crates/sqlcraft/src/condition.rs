//! Condition tree: logic groups and normalized condition nodes.

use crate::value::{SubQuery, Value};

/// Boolean connective joining conditions inside a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Logic {
    And,
    Or,
    Xor,
}

impl Logic {
    /// The SQL keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
            Logic::Xor => "XOR",
        }
    }
}

/// A normalized condition.
///
/// Nodes are shape-resolved at insertion time; operator validation and
/// identifier resolution happen later, when a statement renders.
#[derive(Clone, Debug)]
pub enum ConditionNode {
    /// `field op value`. The combinator overrides the connective used when a
    /// LIKE candidate list expands into several comparisons.
    Item {
        field: String,
        op: String,
        value: Value,
        combinator: Option<Logic>,
    },
    /// Several `(op, value)` pairs on one field, parenthesized and joined by
    /// the combinator.
    Multi {
        field: String,
        items: Vec<(String, Value)>,
        combinator: Logic,
    },
    /// Column-to-column comparison, restricted to the plain comparison set.
    Column {
        field: String,
        op: String,
        other: String,
    },
    /// Trusted fragment with optional positional `?` binds.
    Raw { sql: String, binds: Vec<Value> },
    /// Deferred nested group built by a closure.
    Nested(SubQuery),
}

/// Conditions bucketed by connective.
///
/// Groups always emit in AND, OR, XOR order regardless of insertion order;
/// within a group, insertion order is preserved.
#[derive(Clone, Debug, Default)]
pub struct ConditionTree {
    and: Vec<ConditionNode>,
    or: Vec<ConditionNode>,
    xor: Vec<ConditionNode>,
}

impl ConditionTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node to the given group.
    pub fn push(&mut self, logic: Logic, node: ConditionNode) {
        match logic {
            Logic::And => self.and.push(node),
            Logic::Or => self.or.push(node),
            Logic::Xor => self.xor.push(node),
        }
    }

    /// Whether no conditions have been recorded.
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty() && self.xor.is_empty()
    }

    /// Append every node of `other`, group-wise.
    pub fn merge(&mut self, other: &ConditionTree) {
        self.and.extend(other.and.iter().cloned());
        self.or.extend(other.or.iter().cloned());
        self.xor.extend(other.xor.iter().cloned());
    }

    /// Iterate groups in emission order.
    pub(crate) fn groups(&self) -> impl Iterator<Item = (Logic, &[ConditionNode])> {
        [
            (Logic::And, self.and.as_slice()),
            (Logic::Or, self.or.as_slice()),
            (Logic::Xor, self.xor.as_slice()),
        ]
        .into_iter()
    }
}
