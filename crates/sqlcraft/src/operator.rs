//! Condition operators and their textual aliases.

/// A condition operator after alias normalization.
///
/// Parsing is case-insensitive and accepts the historical shorthand aliases
/// (`eq`, `neq`, `egt`, `elt`, `notin`, ...). Operators a dialect adds on top
/// of this set are resolved through the dialect's extension hook instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    NotLike,
    Between,
    NotBetween,
    In,
    NotIn,
    Null,
    NotNull,
    Exists,
    NotExists,
    Exp,
    GtTime,
    GeTime,
    LtTime,
    LeTime,
    BetweenTime,
    NotBetweenTime,
}

impl Operator {
    /// Parse an operator string, resolving aliases.
    pub fn parse(raw: &str) -> Option<Operator> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let op = match normalized.as_str() {
            "=" | "eq" => Operator::Eq,
            "<>" | "!=" | "neq" | "ne" => Operator::Ne,
            ">" | "gt" => Operator::Gt,
            ">=" | "egt" | "gte" | "ge" => Operator::Ge,
            "<" | "lt" => Operator::Lt,
            "<=" | "elt" | "lte" | "le" => Operator::Le,
            "like" => Operator::Like,
            "not like" | "notlike" => Operator::NotLike,
            "between" => Operator::Between,
            "not between" | "notbetween" => Operator::NotBetween,
            "in" => Operator::In,
            "not in" | "notin" => Operator::NotIn,
            "null" => Operator::Null,
            "not null" | "notnull" => Operator::NotNull,
            "exists" => Operator::Exists,
            "not exists" | "notexists" => Operator::NotExists,
            "exp" => Operator::Exp,
            "> time" | "gt time" => Operator::GtTime,
            ">= time" | "egt time" => Operator::GeTime,
            "< time" | "lt time" => Operator::LtTime,
            "<= time" | "elt time" => Operator::LeTime,
            "between time" => Operator::BetweenTime,
            "not between time" | "notbetween time" => Operator::NotBetweenTime,
            _ => return None,
        };
        Some(op)
    }

    /// The canonical SQL spelling.
    pub fn sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt | Operator::GtTime => ">",
            Operator::Ge | Operator::GeTime => ">=",
            Operator::Lt | Operator::LtTime => "<",
            Operator::Le | Operator::LeTime => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Between | Operator::BetweenTime => "BETWEEN",
            Operator::NotBetween | Operator::NotBetweenTime => "NOT BETWEEN",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Null => "IS NULL",
            Operator::NotNull => "IS NOT NULL",
            Operator::Exists => "EXISTS",
            Operator::NotExists => "NOT EXISTS",
            Operator::Exp => "",
        }
    }

    /// Whether this is one of the six plain comparison operators.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Ne
                | Operator::Gt
                | Operator::Ge
                | Operator::Lt
                | Operator::Le
        )
    }
}
