//! Query state, the fluent builder API and the render entry points.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::builder::dialect::{Dialect, KeyContext};
use crate::builder::mysql::Mysql;
use crate::builder::{Statement, StatementCompiler};
use crate::condition::{ConditionNode, ConditionTree, Logic};
use crate::error::SqlResult;
use crate::time;
use crate::value::{SubQuery, Value};

// A plain field string with any of these is treated as a raw fragment.
static RAW_CONDITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[,=<'"(\s]"#).expect("hardcoded pattern"));

// Field selections with these are kept verbatim (function calls, quoting).
static RAW_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<'"(]"#).expect("hardcoded pattern"));

/// A selected field.
#[derive(Clone, Debug)]
pub(crate) enum FieldSel {
    Plain(String),
    Alias(String, String),
    Raw(String),
}

/// A data assignment for INSERT / UPDATE.
#[derive(Clone, Debug)]
pub(crate) enum DataItem {
    Value(Value),
    Raw(String),
    Inc(i64),
    Dec(i64),
    Invalid(String),
}

/// Join variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Join {
    pub(crate) table: String,
    pub(crate) on: Vec<String>,
    pub(crate) kind: JoinType,
}

#[derive(Clone, Debug)]
pub(crate) enum OrderItem {
    Field {
        field: String,
        dir: Option<String>,
    },
    Raw {
        sql: String,
        binds: Vec<Value>,
    },
    Rand,
    FieldPriority {
        field: String,
        values: Vec<Value>,
        dir: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub(crate) enum UnionSource {
    Sql(String),
    Sub(SubQuery),
}

/// A fluent statement builder.
///
/// Builder methods consume and return `self`; nothing validates until one of
/// the render entry points runs. Rendering takes `&self` and composes a fresh
/// bind table each time, so a builder can be rendered repeatedly.
///
/// ```ignore
/// use sqlcraft::Query;
///
/// let sql = Query::new()
///     .table("user")
///     .where_cond("id", ">", 1)
///     .where_eq("name", "alice")
///     .select_sql()?;
/// assert_eq!(sql, "SELECT * FROM user WHERE id > 1 AND name = 'alice'");
/// # Ok::<(), sqlcraft::SqlError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Query {
    pub(crate) dialect: Rc<dyn Dialect>,
    pub(crate) tables: Vec<(String, Option<String>)>,
    pub(crate) aliases: HashMap<String, String>,
    pub(crate) fields: Vec<FieldSel>,
    pub(crate) excluded: Vec<String>,
    pub(crate) distinct: bool,
    pub(crate) data: Vec<(String, DataItem)>,
    pub(crate) tree: ConditionTree,
    pub(crate) joins: Vec<Join>,
    pub(crate) orders: Vec<OrderItem>,
    pub(crate) group: Option<String>,
    pub(crate) having: Option<String>,
    pub(crate) limit: Option<String>,
    pub(crate) page: Option<(u64, u64)>,
    pub(crate) unions: Vec<(UnionSource, bool)>,
    pub(crate) lock: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) force_index: Option<String>,
    pub(crate) ignore_index: Option<String>,
    pub(crate) using: Option<String>,
    pub(crate) strict: bool,
    pub(crate) via: Option<String>,
    pub(crate) json_fields: HashMap<String, String>,
    pub(crate) time_rules: HashMap<String, (String, String)>,
    pub(crate) now: Option<NaiveDateTime>,
    pub(crate) fail_on_empty: bool,
    pub(crate) fetch_collection: bool,
    pub(crate) cache_key: Option<String>,
    pub(crate) master: bool,
}

impl Default for Query {
    fn default() -> Self {
        Query::new()
    }
}

impl Query {
    /// Create a builder using the MySQL dialect.
    pub fn new() -> Self {
        Self::with_dialect(Rc::new(Mysql))
    }

    /// Create a builder for an explicit dialect.
    pub fn with_dialect(dialect: Rc<dyn Dialect>) -> Self {
        Query {
            dialect,
            tables: Vec::new(),
            aliases: HashMap::new(),
            fields: Vec::new(),
            excluded: Vec::new(),
            distinct: false,
            data: Vec::new(),
            tree: ConditionTree::new(),
            joins: Vec::new(),
            orders: Vec::new(),
            group: None,
            having: None,
            limit: None,
            page: None,
            unions: Vec::new(),
            lock: None,
            comment: None,
            force_index: None,
            ignore_index: None,
            using: None,
            strict: true,
            via: None,
            json_fields: HashMap::new(),
            time_rules: HashMap::new(),
            now: None,
            fail_on_empty: false,
            fetch_collection: false,
            cache_key: None,
            master: false,
        }
    }

    pub(crate) fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub(crate) fn key_context(&self) -> KeyContext<'_> {
        KeyContext {
            table: self.tables.first().map(|(name, _)| name.as_str()),
            aliases: &self.aliases,
            via: self.via.as_deref(),
            strict: self.strict,
        }
    }

    /// Seed for a deferred subquery: same dialect, time anchor and rules,
    /// otherwise empty state.
    pub(crate) fn child_query(&self) -> Query {
        let mut child = Query::with_dialect(self.dialect.clone());
        child.now = self.now;
        child.time_rules = self.time_rules.clone();
        child.strict = self.strict;
        child
    }

    /// Seed for a nested condition group: inherits the identifier context so
    /// aliases and the via prefix keep resolving inside the group.
    pub(crate) fn child_for_group(&self) -> Query {
        let mut child = self.child_query();
        child.tables = self.tables.clone();
        child.aliases = self.aliases.clone();
        child.via = self.via.clone();
        child
    }

    pub(crate) fn tree(&self) -> &ConditionTree {
        &self.tree
    }

    /// Resolve a symbolic time-rule name: caller-registered rules first,
    /// then the built-in table.
    pub(crate) fn resolve_time_rule(&self, name: &str) -> Option<(String, String)> {
        let key = name.trim().to_ascii_lowercase();
        if let Some((start, end)) = self.time_rules.get(&key) {
            return Some((start.clone(), end.clone()));
        }
        time::builtin_range(name, self.now_anchor())
            .map(|(start, end)| (time::format(start), time::format(end)))
    }

    pub(crate) fn now_anchor(&self) -> NaiveDateTime {
        self.now
            .unwrap_or_else(|| chrono::Local::now().naive_local())
    }

    // ==================== Target tables ====================

    /// Set the target table. Accepts `"user"`, `"user u"` (inline alias),
    /// comma-separated lists and parenthesized subquery text.
    pub fn table(mut self, table: &str) -> Self {
        let table = table.trim();
        if table.contains('(') {
            self.tables.push((table.to_string(), None));
            return self;
        }
        for part in table.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once(' ') {
                Some((name, alias)) => {
                    let (name, alias) = (name.trim(), alias.trim());
                    self.aliases.insert(name.to_string(), alias.to_string());
                    self.tables
                        .push((name.to_string(), Some(alias.to_string())));
                }
                None => self.tables.push((part.to_string(), None)),
            }
        }
        self
    }

    /// Alias the primary table (call after [`Query::table`]).
    pub fn alias(mut self, alias: &str) -> Self {
        if let Some((name, slot)) = self.tables.first_mut() {
            self.aliases.insert(name.clone(), alias.to_string());
            *slot = Some(alias.to_string());
        }
        self
    }

    /// Register an alias for a specific table.
    pub fn alias_for(mut self, table: &str, alias: &str) -> Self {
        self.aliases.insert(table.to_string(), alias.to_string());
        for (name, slot) in &mut self.tables {
            if name == table {
                *slot = Some(alias.to_string());
            }
        }
        self
    }

    /// Prefix unqualified keys with this alias (inherited view context).
    pub fn via(mut self, prefix: &str) -> Self {
        self.via = Some(prefix.to_string());
        self
    }

    // ==================== Field selection ====================

    /// Add selected fields from a comma-separated list. Fragments containing
    /// quotes or parentheses are kept verbatim.
    pub fn field(mut self, field: &str) -> Self {
        if RAW_FIELD.is_match(field) {
            self.fields.push(FieldSel::Raw(field.trim().to_string()));
            return self;
        }
        for part in field.split(',') {
            let part = part.trim();
            if !part.is_empty() {
                self.fields.push(FieldSel::Plain(part.to_string()));
            }
        }
        self
    }

    /// Add several plain fields.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for f in fields {
            self = self.field(f);
        }
        self
    }

    /// Add a trusted field fragment.
    pub fn field_raw(mut self, fragment: &str) -> Self {
        self.fields.push(FieldSel::Raw(fragment.trim().to_string()));
        self
    }

    /// Add an aliased field: `field AS alias`.
    pub fn field_alias(mut self, field: &str, alias: &str) -> Self {
        self.fields
            .push(FieldSel::Alias(field.to_string(), alias.to_string()));
        self
    }

    /// Exclude fields from the accumulated selection.
    pub fn field_except(mut self, fields: &[&str]) -> Self {
        self.excluded
            .extend(fields.iter().map(|f| f.trim().to_string()));
        self
    }

    /// SELECT DISTINCT.
    pub fn distinct(mut self, on: bool) -> Self {
        self.distinct = on;
        self
    }

    // ==================== Data assignments ====================

    /// Assign a value for INSERT / UPDATE. Keys of the form `field->path`
    /// compile to a JSON member assignment.
    pub fn data(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.data
            .push((field.to_string(), DataItem::Value(value.into())));
        self
    }

    /// Assign a trusted expression.
    pub fn data_expr(mut self, field: &str, raw: &str) -> Self {
        self.data
            .push((field.to_string(), DataItem::Raw(raw.to_string())));
        self
    }

    /// Assign every member of a JSON object. Non-object input is recorded
    /// and reported as an unsupported data shape at render time.
    pub fn data_json(mut self, value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map {
                    self.data.push((key, DataItem::Value(Value::from(val))));
                }
            }
            other => {
                self.data.push((
                    String::new(),
                    DataItem::Invalid(format!("expected a JSON object, got {other}")),
                ));
            }
        }
        self
    }

    /// Increment a column by `step`.
    pub fn inc(mut self, field: &str, step: i64) -> Self {
        self.data.push((field.to_string(), DataItem::Inc(step)));
        self
    }

    /// Decrement a column by `step`.
    pub fn dec(mut self, field: &str, step: i64) -> Self {
        self.data.push((field.to_string(), DataItem::Dec(step)));
        self
    }

    // ==================== Conditions ====================

    fn push_node(mut self, logic: Logic, node: ConditionNode) -> Self {
        self.tree.push(logic, node);
        self
    }

    fn push_item(self, logic: Logic, field: &str, op: &str, value: Value) -> Self {
        self.push_node(
            logic,
            ConditionNode::Item {
                field: field.to_string(),
                op: op.to_string(),
                value,
                combinator: None,
            },
        )
    }

    /// Add an AND condition from a `(field, operator, value)` triple.
    pub fn where_cond(self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, op, value.into())
    }

    /// Add an OR condition.
    pub fn or_where(self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::Or, field, op, value.into())
    }

    /// Add an XOR condition.
    pub fn xor_where(self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::Xor, field, op, value.into())
    }

    /// Equality shorthand. A `Null` value compiles to a NULL test; a field
    /// string containing condition syntax is demoted to a raw fragment.
    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        if RAW_CONDITION.is_match(field) {
            return self.where_raw(field);
        }
        self.push_item(Logic::And, field, "=", value.into())
    }

    /// `field IS NULL`.
    pub fn where_null(self, field: &str) -> Self {
        self.push_item(Logic::And, field, "null", Value::Null)
    }

    /// `field IS NOT NULL`.
    pub fn where_not_null(self, field: &str) -> Self {
        self.push_item(Logic::And, field, "not null", Value::Null)
    }

    /// `field IN (...)`. Accepts a list or a comma-separated string.
    pub fn where_in(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, "in", value.into())
    }

    /// `field NOT IN (...)`.
    pub fn where_not_in(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, "not in", value.into())
    }

    /// `field LIKE pattern`. A pattern list expands OR-joined.
    pub fn where_like(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, "like", value.into())
    }

    /// `field LIKE ...` over a pattern list, AND-joined.
    pub fn where_like_all(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_node(
            Logic::And,
            ConditionNode::Item {
                field: field.to_string(),
                op: "like".to_string(),
                value: value.into(),
                combinator: Some(Logic::And),
            },
        )
    }

    /// `field NOT LIKE pattern`.
    pub fn where_not_like(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, "not like", value.into())
    }

    /// `field BETWEEN a AND b`. Accepts a two-element list or `"a,b"`.
    pub fn where_between(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, "between", value.into())
    }

    /// `field NOT BETWEEN a AND b`.
    pub fn where_not_between(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, "not between", value.into())
    }

    /// `field <raw>` where the fragment is trusted.
    pub fn where_exp(self, field: &str, raw: &str) -> Self {
        self.push_item(
            Logic::And,
            field,
            "exp",
            Value::Expr(crate::expr::Expr::new(raw)),
        )
    }

    /// Column-to-column comparison. Only the six plain comparison operators
    /// are accepted; anything else fails at render time.
    pub fn where_column(self, field: &str, op: &str, other: &str) -> Self {
        self.push_node(
            Logic::And,
            ConditionNode::Column {
                field: field.to_string(),
                op: op.to_string(),
                other: other.to_string(),
            },
        )
    }

    /// `EXISTS (subquery)`.
    pub fn where_exists(self, f: impl Fn(Query) -> Query + 'static) -> Self {
        self.push_item(Logic::And, "", "exists", Value::sub(f))
    }

    /// `NOT EXISTS (subquery)`.
    pub fn where_not_exists(self, f: impl Fn(Query) -> Query + 'static) -> Self {
        self.push_item(Logic::And, "", "not exists", Value::sub(f))
    }

    /// `EXISTS (...)` over a trusted fragment.
    pub fn where_exists_sql(self, raw: &str) -> Self {
        self.push_item(
            Logic::And,
            "",
            "exists",
            Value::Expr(crate::expr::Expr::new(raw)),
        )
    }

    /// Add a trusted AND fragment.
    pub fn where_raw(self, sql: &str) -> Self {
        self.push_node(
            Logic::And,
            ConditionNode::Raw {
                sql: sql.to_string(),
                binds: Vec::new(),
            },
        )
    }

    /// Add a trusted OR fragment.
    pub fn or_where_raw(self, sql: &str) -> Self {
        self.push_node(
            Logic::Or,
            ConditionNode::Raw {
                sql: sql.to_string(),
                binds: Vec::new(),
            },
        )
    }

    /// Add a trusted AND fragment with positional `?` binds.
    pub fn where_raw_bind(self, sql: &str, binds: Vec<Value>) -> Self {
        self.push_node(
            Logic::And,
            ConditionNode::Raw {
                sql: sql.to_string(),
                binds,
            },
        )
    }

    /// Nested AND group built by a closure.
    pub fn where_group(self, f: impl Fn(Query) -> Query + 'static) -> Self {
        self.push_node(Logic::And, ConditionNode::Nested(SubQuery::new(f)))
    }

    /// Nested OR group built by a closure.
    pub fn or_where_group(self, f: impl Fn(Query) -> Query + 'static) -> Self {
        self.push_node(Logic::Or, ConditionNode::Nested(SubQuery::new(f)))
    }

    /// Nested XOR group built by a closure.
    pub fn xor_where_group(self, f: impl Fn(Query) -> Query + 'static) -> Self {
        self.push_node(Logic::Xor, ConditionNode::Nested(SubQuery::new(f)))
    }

    /// Several `(op, value)` pairs on one field, parenthesized and joined by
    /// `combinator`.
    pub fn where_multi(
        self,
        field: &str,
        items: Vec<(&str, Value)>,
        combinator: Logic,
    ) -> Self {
        self.push_node(
            Logic::And,
            ConditionNode::Multi {
                field: field.to_string(),
                items: items
                    .into_iter()
                    .map(|(op, value)| (op.to_string(), value))
                    .collect(),
                combinator,
            },
        )
    }

    /// Field-to-value map shorthand: `Null` becomes a NULL test, a list
    /// becomes IN, everything else equality.
    pub fn where_map<S, V>(mut self, pairs: impl IntoIterator<Item = (S, V)>) -> Self
    where
        S: Into<String>,
        V: Into<Value>,
    {
        for (field, value) in pairs {
            let field = field.into();
            let value = value.into();
            let op = match value {
                Value::Null => "null",
                Value::List(_) => "in",
                _ => "=",
            };
            self = self.push_item(Logic::And, &field, op, value);
        }
        self
    }

    /// [`Query::where_map`] over a JSON object. Non-object input is ignored.
    pub fn where_map_json(self, value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => {
                self.where_map(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
            _ => self,
        }
    }

    /// A list of `(field, op, value)` triples, each its own AND node.
    pub fn where_list<S, O, V>(mut self, triples: impl IntoIterator<Item = (S, O, V)>) -> Self
    where
        S: Into<String>,
        O: Into<String>,
        V: Into<Value>,
    {
        for (field, op, value) in triples {
            self = self.push_item(Logic::And, &field.into(), &op.into(), value.into());
        }
        self
    }

    /// Reuse another builder's conditions, merged group-wise.
    pub fn where_query(mut self, other: &Query) -> Self {
        self.tree.merge(&other.tree);
        self
    }

    /// Time comparison: `op` is a plain comparison, the value may be a
    /// datetime string, a unix timestamp or a symbolic rule name.
    pub fn where_time(self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.push_item(Logic::And, field, &format!("{op} time"), value.into())
    }

    /// `field BETWEEN start AND end` over time values.
    pub fn where_between_time(
        self,
        field: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        self.push_item(
            Logic::And,
            field,
            "between time",
            Value::List(vec![start.into(), end.into()]),
        )
    }

    /// `field NOT BETWEEN start AND end` over time values.
    pub fn where_not_between_time(
        self,
        field: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        self.push_item(
            Logic::And,
            field,
            "not between time",
            Value::List(vec![start.into(), end.into()]),
        )
    }

    // ==================== Joins and unions ====================

    /// INNER JOIN.
    pub fn join(self, table: &str, on: &str) -> Self {
        self.join_with(table, on, JoinType::Inner)
    }

    /// LEFT JOIN.
    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.join_with(table, on, JoinType::Left)
    }

    /// RIGHT JOIN.
    pub fn right_join(self, table: &str, on: &str) -> Self {
        self.join_with(table, on, JoinType::Right)
    }

    /// FULL JOIN.
    pub fn full_join(self, table: &str, on: &str) -> Self {
        self.join_with(table, on, JoinType::Full)
    }

    /// Join with an explicit type. `table` accepts `"name alias"` and
    /// parenthesized subquery text.
    pub fn join_with(self, table: &str, on: &str, kind: JoinType) -> Self {
        self.join_on(table, &[on], kind)
    }

    /// Join with several ON conditions; they compile AND-joined.
    pub fn join_on(mut self, table: &str, on: &[&str], kind: JoinType) -> Self {
        let table = table.trim();
        if !table.contains('(') {
            if let Some((name, alias)) = table.split_once(' ') {
                self.aliases
                    .insert(name.trim().to_string(), alias.trim().to_string());
            }
        }
        self.joins.push(Join {
            table: table.to_string(),
            on: on.iter().map(|cond| cond.trim().to_string()).collect(),
            kind,
        });
        self
    }

    /// UNION with literal SQL.
    pub fn union(mut self, sql: &str) -> Self {
        self.unions
            .push((UnionSource::Sql(sql.trim().to_string()), false));
        self
    }

    /// UNION ALL with literal SQL.
    pub fn union_all(mut self, sql: &str) -> Self {
        self.unions
            .push((UnionSource::Sql(sql.trim().to_string()), true));
        self
    }

    /// UNION with a deferred subquery.
    pub fn union_sub(mut self, f: impl Fn(Query) -> Query + 'static) -> Self {
        self.unions.push((UnionSource::Sub(SubQuery::new(f)), false));
        self
    }

    /// UNION ALL with a deferred subquery.
    pub fn union_all_sub(mut self, f: impl Fn(Query) -> Query + 'static) -> Self {
        self.unions.push((UnionSource::Sub(SubQuery::new(f)), true));
        self
    }

    // ==================== Ordering, grouping, paging ====================

    /// Add order clauses from `"field [asc|desc]"`, comma-separated.
    pub fn order(mut self, order: &str) -> Self {
        for part in order.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once(' ') {
                Some((field, dir)) => self.orders.push(OrderItem::Field {
                    field: field.trim().to_string(),
                    dir: Some(dir.trim().to_string()),
                }),
                None => self.orders.push(OrderItem::Field {
                    field: part.to_string(),
                    dir: None,
                }),
            }
        }
        self
    }

    /// Add an order clause with an explicit direction.
    pub fn order_by(mut self, field: &str, dir: &str) -> Self {
        self.orders.push(OrderItem::Field {
            field: field.to_string(),
            dir: Some(dir.to_string()),
        });
        self
    }

    /// Add a trusted order fragment with positional `?` binds.
    pub fn order_raw(mut self, sql: &str, binds: Vec<Value>) -> Self {
        self.orders.push(OrderItem::Raw {
            sql: sql.to_string(),
            binds,
        });
        self
    }

    /// Random ordering (dialect-specific function).
    pub fn order_rand(mut self) -> Self {
        self.orders.push(OrderItem::Rand);
        self
    }

    /// Priority ordering: `field(col, v1, v2, ...) [dir]`.
    pub fn order_field_priority(
        mut self,
        field: &str,
        values: Vec<Value>,
        dir: Option<&str>,
    ) -> Self {
        self.orders.push(OrderItem::FieldPriority {
            field: field.to_string(),
            values,
            dir: dir.map(str::to_string),
        });
        self
    }

    /// GROUP BY.
    pub fn group(mut self, field: &str) -> Self {
        self.group = Some(field.to_string());
        self
    }

    /// HAVING (trusted fragment).
    pub fn having(mut self, fragment: &str) -> Self {
        self.having = Some(fragment.to_string());
        self
    }

    /// LIMIT n.
    pub fn limit(mut self, rows: u64) -> Self {
        self.limit = Some(rows.to_string());
        self
    }

    /// LIMIT offset,n.
    pub fn limit_offset(mut self, offset: u64, rows: u64) -> Self {
        self.limit = Some(format!("{offset},{rows}"));
        self
    }

    /// Pagination; folds into LIMIT at render time when no explicit limit is
    /// set. Page numbers start at 1.
    pub fn page(mut self, page: u64, per_page: u64) -> Self {
        self.page = Some((page.max(1), per_page));
        self
    }

    // ==================== Statement decorations ====================

    /// `FOR UPDATE` row locking.
    pub fn lock(mut self, on: bool) -> Self {
        self.lock = if on { Some("FOR UPDATE".to_string()) } else { None };
        self
    }

    /// A custom lock clause, e.g. `lock in share mode`.
    pub fn lock_clause(mut self, clause: &str) -> Self {
        self.lock = Some(clause.trim().to_string());
        self
    }

    /// Inline comment; text truncates at any `*/`.
    pub fn comment(mut self, text: &str) -> Self {
        self.comment = Some(text.to_string());
        self
    }

    /// FORCE INDEX hint.
    pub fn force_index(mut self, index: &str) -> Self {
        self.force_index = Some(index.trim().to_string());
        self
    }

    /// IGNORE INDEX hint.
    pub fn ignore_index(mut self, index: &str) -> Self {
        self.ignore_index = Some(index.trim().to_string());
        self
    }

    /// USING clause for multi-table DELETE.
    pub fn using(mut self, table: &str) -> Self {
        self.using = Some(table.trim().to_string());
        self
    }

    /// Toggle strict identifier checking (on by default).
    pub fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }

    /// Declare a column's JSON storage type, letting list values encode as
    /// JSON text instead of failing.
    pub fn json_type(mut self, field: &str, ty: &str) -> Self {
        self.json_fields
            .insert(field.to_string(), ty.to_string());
        self
    }

    /// Register a custom symbolic time rule.
    pub fn time_rule(mut self, name: &str, start: &str, end: &str) -> Self {
        self.time_rules.insert(
            name.trim().to_ascii_lowercase(),
            (start.to_string(), end.to_string()),
        );
        self
    }

    /// Pin the reference time used by symbolic time rules.
    pub fn time_anchor(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    // ==================== Intent flags (pass-through) ====================

    /// Mark the result for caching under the given key.
    pub fn cache(mut self, key: &str) -> Self {
        self.cache_key = Some(key.to_string());
        self
    }

    /// Ask the executor to fail instead of returning an empty result.
    pub fn fail_on_empty(mut self, on: bool) -> Self {
        self.fail_on_empty = on;
        self
    }

    /// Ask the executor to return a collection wrapper.
    pub fn fetch_collection(mut self, on: bool) -> Self {
        self.fetch_collection = on;
        self
    }

    /// Route reads to the primary node.
    pub fn master(mut self, on: bool) -> Self {
        self.master = on;
        self
    }

    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref()
    }

    pub fn fails_on_empty(&self) -> bool {
        self.fail_on_empty
    }

    pub fn wants_collection(&self) -> bool {
        self.fetch_collection
    }

    pub fn prefers_master(&self) -> bool {
        self.master
    }

    // ==================== Render entry points ====================

    /// Compile a SELECT into SQL with placeholders plus its bind table.
    pub fn build_select(&self) -> SqlResult<Statement> {
        StatementCompiler::new().select(self)
    }

    /// Compile an INSERT.
    pub fn build_insert(&self) -> SqlResult<Statement> {
        StatementCompiler::new().insert(self, false)
    }

    /// Compile a REPLACE.
    pub fn build_replace(&self) -> SqlResult<Statement> {
        StatementCompiler::new().insert(self, true)
    }

    /// Compile an UPDATE.
    pub fn build_update(&self) -> SqlResult<Statement> {
        StatementCompiler::new().update(self)
    }

    /// Compile a DELETE. Without conditions this fails unless `force` is set.
    pub fn build_delete(&self, force: bool) -> SqlResult<Statement> {
        StatementCompiler::new().delete(self, force)
    }

    /// Render the SELECT with all parameters substituted in.
    pub fn select_sql(&self) -> SqlResult<String> {
        let sql = self.build_select()?.display();
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %sql, "select compiled");
        Ok(sql)
    }

    /// Render the INSERT; empty data yields an empty string.
    pub fn insert_sql(&self) -> SqlResult<String> {
        let sql = self.build_insert()?.display();
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %sql, "insert compiled");
        Ok(sql)
    }

    /// Render the REPLACE; empty data yields an empty string.
    pub fn replace_sql(&self) -> SqlResult<String> {
        let sql = self.build_replace()?.display();
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %sql, "replace compiled");
        Ok(sql)
    }

    /// Render the UPDATE; empty data yields an empty string.
    pub fn update_sql(&self) -> SqlResult<String> {
        let sql = self.build_update()?.display();
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %sql, "update compiled");
        Ok(sql)
    }

    /// Render the DELETE.
    pub fn delete_sql(&self, force: bool) -> SqlResult<String> {
        let sql = self.build_delete(force)?.display();
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %sql, "delete compiled");
        Ok(sql)
    }

    /// Render as a parenthesized subquery usable as a join target or value.
    pub fn build_subquery(&self) -> SqlResult<String> {
        Ok(format!("( {} )", self.build_select()?.display()))
    }
}
