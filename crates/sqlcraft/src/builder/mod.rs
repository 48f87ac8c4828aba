//! Clause compilers and statement assembly.
//!
//! The compiler walks a [`Query`]'s state, resolves identifiers through the
//! dialect, collects bind parameters and substitutes the compiled clause
//! fragments into the dialect's verb template. Every compile run owns a fresh
//! [`BindTable`].

pub mod dialect;
pub mod mysql;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use crate::bind::BindTable;
use crate::condition::{ConditionNode, ConditionTree, Logic};
use crate::error::{SqlError, SqlResult};
use crate::operator::Operator;
use crate::query::{DataItem, FieldSel, OrderItem, Query, UnionSource};
use crate::value::{SubQuery, Value};

/// A compiled statement: SQL with `:name` placeholders plus its bind table.
#[derive(Clone, Debug)]
pub struct Statement {
    pub sql: String,
    pub binds: BindTable,
}

impl Statement {
    /// The SQL with every placeholder substituted by its literal value.
    pub fn display(&self) -> String {
        self.binds.apply(&self.sql)
    }

    /// Whether the statement compiled to nothing (INSERT / UPDATE with no
    /// data).
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

fn fill(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (tag, value) in pairs {
        out = out.replace(tag, value);
    }
    out.trim().to_string()
}

pub(crate) struct StatementCompiler {
    binds: BindTable,
}

impl StatementCompiler {
    pub(crate) fn new() -> Self {
        StatementCompiler {
            binds: BindTable::new(),
        }
    }

    fn key(&self, q: &Query, key: &str) -> SqlResult<String> {
        q.dialect().parse_key(key, &q.key_context())
    }

    // ==================== Statements ====================

    pub(crate) fn select(mut self, q: &Query) -> SqlResult<Statement> {
        let field = self.compile_field(q)?;
        let table = self.compile_table(q);
        let join = self.compile_join(q)?;
        let where_clause = self.compile_where(q)?;
        let group = self.compile_group(q)?;
        let having = compile_having(q);
        let union = self.compile_union(q)?;
        let order = self.compile_order(q)?;
        let sql = fill(
            q.dialect().select_template(),
            &[
                ("%DISTINCT%", if q.distinct { " DISTINCT" } else { "" }),
                ("%FIELD%", &field),
                ("%TABLE%", &table),
                ("%FORCE%", &compile_force(q)),
                ("%IGNORE%", &compile_ignore(q)),
                ("%JOIN%", &join),
                ("%WHERE%", &where_clause),
                ("%GROUP%", &group),
                ("%HAVING%", &having),
                ("%UNION%", &union),
                ("%ORDER%", &order),
                ("%LIMIT%", &compile_limit(q)),
                ("%LOCK%", &compile_lock(q)),
                ("%COMMENT%", &compile_comment(q)),
            ],
        );
        Ok(Statement {
            sql,
            binds: self.binds,
        })
    }

    pub(crate) fn insert(mut self, q: &Query, replace: bool) -> SqlResult<Statement> {
        let items = self.compile_data(q)?;
        if items.is_empty() {
            return Ok(Statement {
                sql: String::new(),
                binds: self.binds,
            });
        }
        let fields = items
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let values = items
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let table = self.compile_table(q);
        let sql = fill(
            q.dialect().insert_template(),
            &[
                ("%INSERT%", if replace { "REPLACE" } else { "INSERT" }),
                ("%TABLE%", &table),
                ("%FIELD%", &fields),
                ("%DATA%", &values),
                ("%COMMENT%", &compile_comment(q)),
            ],
        );
        Ok(Statement {
            sql,
            binds: self.binds,
        })
    }

    pub(crate) fn update(mut self, q: &Query) -> SqlResult<Statement> {
        let items = self.compile_data(q)?;
        if items.is_empty() {
            return Ok(Statement {
                sql: String::new(),
                binds: self.binds,
            });
        }
        let set = items
            .iter()
            .map(|(k, v)| format!("{k} = {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        let table = self.compile_table(q);
        let join = self.compile_join(q)?;
        let where_clause = self.compile_where(q)?;
        let order = self.compile_order(q)?;
        let sql = fill(
            q.dialect().update_template(),
            &[
                ("%TABLE%", &table),
                ("%JOIN%", &join),
                ("%SET%", &set),
                ("%WHERE%", &where_clause),
                ("%ORDER%", &order),
                ("%LIMIT%", &compile_limit(q)),
                ("%LOCK%", &compile_lock(q)),
                ("%COMMENT%", &compile_comment(q)),
            ],
        );
        Ok(Statement {
            sql,
            binds: self.binds,
        })
    }

    pub(crate) fn delete(mut self, q: &Query, force: bool) -> SqlResult<Statement> {
        let table = self.compile_table(q);
        let join = self.compile_join(q)?;
        let where_clause = self.compile_where(q)?;
        if where_clause.is_empty() && !force {
            return Err(SqlError::MissingDeleteCondition);
        }
        let order = self.compile_order(q)?;
        let sql = fill(
            q.dialect().delete_template(),
            &[
                ("%TABLE%", &table),
                ("%USING%", &compile_using(q)),
                ("%JOIN%", &join),
                ("%WHERE%", &where_clause),
                ("%ORDER%", &order),
                ("%LIMIT%", &compile_limit(q)),
                ("%LOCK%", &compile_lock(q)),
                ("%COMMENT%", &compile_comment(q)),
            ],
        );
        Ok(Statement {
            sql,
            binds: self.binds,
        })
    }

    // ==================== Clause compilers ====================

    fn compile_field(&mut self, q: &Query) -> SqlResult<String> {
        let excluded: HashSet<&str> = q.excluded.iter().map(String::as_str).collect();
        let mut parts = Vec::new();
        for sel in &q.fields {
            match sel {
                FieldSel::Plain(field) => {
                    if !excluded.contains(field.as_str()) {
                        parts.push(self.key(q, field)?);
                    }
                }
                FieldSel::Alias(field, alias) => {
                    if !excluded.contains(field.as_str()) {
                        parts.push(format!("{} AS {alias}", self.key(q, field)?));
                    }
                }
                FieldSel::Raw(raw) => parts.push(raw.clone()),
            }
        }
        if parts.is_empty() {
            Ok("*".to_string())
        } else {
            Ok(parts.join(","))
        }
    }

    fn compile_table(&mut self, q: &Query) -> String {
        let mut parts = Vec::new();
        for (name, alias) in &q.tables {
            match alias {
                Some(alias) if !name.contains('(') => parts.push(format!("{name} {alias}")),
                _ => parts.push(name.clone()),
            }
        }
        parts.join(",")
    }

    fn compile_join(&mut self, q: &Query) -> SqlResult<String> {
        let mut out = String::new();
        for join in &q.joins {
            let mut conds = Vec::new();
            for on in &join.on {
                conds.push(self.join_on(q, on)?);
            }
            let on = conds.join(" AND ");
            out.push_str(&format!(" {} {} ON {on}", join.kind.keyword(), join.table));
        }
        Ok(out)
    }

    // A simple `a=b` equality gets both sides resolved; comparisons like
    // `a>=b` and anything more elaborate pass through untouched.
    fn join_on(&self, q: &Query, on: &str) -> SqlResult<String> {
        if let Some((left, right)) = on.split_once('=') {
            let (left, right) = (left.trim(), right.trim());
            let plain = !left.is_empty()
                && !left.contains([' ', '<', '>', '!'])
                && !right.contains(' ')
                && !right.contains('=');
            if plain {
                return Ok(format!("{}={}", self.key(q, left)?, self.key(q, right)?));
            }
        }
        Ok(on.to_string())
    }

    fn compile_where(&mut self, q: &Query) -> SqlResult<String> {
        let clause = self.compile_tree(q, q.tree())?;
        if clause.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!(" WHERE {clause}"))
        }
    }

    fn compile_group(&mut self, q: &Query) -> SqlResult<String> {
        let Some(group) = &q.group else {
            return Ok(String::new());
        };
        let mut parts = Vec::new();
        for field in group.split(',') {
            let field = field.trim();
            if !field.is_empty() {
                parts.push(self.key(q, field)?);
            }
        }
        Ok(format!(" GROUP BY {}", parts.join(",")))
    }

    fn compile_union(&mut self, q: &Query) -> SqlResult<String> {
        let mut out = String::new();
        for (source, all) in &q.unions {
            let keyword = if *all { "UNION ALL" } else { "UNION" };
            match source {
                UnionSource::Sql(sql) => out.push_str(&format!(" {keyword} {sql}")),
                UnionSource::Sub(sub) => {
                    let inner = self.subquery(q, sub)?;
                    out.push_str(&format!(" {keyword} ( {inner} )"));
                }
            }
        }
        Ok(out)
    }

    fn compile_order(&mut self, q: &Query) -> SqlResult<String> {
        if q.orders.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::new();
        for item in &q.orders {
            match item {
                OrderItem::Field { field, dir } => {
                    let dir = order_direction(dir.as_deref())?;
                    parts.push(format!("{}{dir}", self.key(q, field)?));
                }
                OrderItem::Raw { sql, binds } => {
                    parts.push(self.binds.bind_positional(sql, binds));
                }
                OrderItem::Rand => parts.push(q.dialect().random_order().to_string()),
                OrderItem::FieldPriority { field, values, dir } => {
                    let key = self.key(q, field)?;
                    let placeholders = values
                        .iter()
                        .map(|v| self.binds.bind(v.clone()))
                        .collect::<Vec<_>>()
                        .join(",");
                    let dir = order_direction(dir.as_deref())?;
                    parts.push(format!("field({key},{placeholders}){dir}"));
                }
            }
        }
        Ok(format!(" ORDER BY {}", parts.join(",")))
    }

    // ==================== Data ====================

    fn compile_data(&mut self, q: &Query) -> SqlResult<Vec<(String, String)>> {
        let declared = declared_columns(q);
        let mut out = Vec::new();
        for (field, item) in &q.data {
            if let DataItem::Invalid(msg) = item {
                return Err(SqlError::data(msg.clone()));
            }
            if let Some(declared) = &declared {
                let base = field.split_once("->").map(|(b, _)| b).unwrap_or(field);
                if !declared.contains(base.trim()) {
                    if q.strict {
                        return Err(SqlError::field(field.clone()));
                    }
                    continue;
                }
            }
            if let Some((base, path)) = field.split_once("->") {
                let base = self.key(q, base.trim())?;
                let value = match item {
                    DataItem::Value(v) => self.data_value(q, field, v)?,
                    DataItem::Raw(raw) => raw.clone(),
                    _ => {
                        return Err(SqlError::data(format!(
                            "cannot step JSON member {field}"
                        )));
                    }
                };
                out.push((
                    base.clone(),
                    q.dialect().json_set(&base, path.trim(), &value),
                ));
                continue;
            }
            let key = self.key(q, field)?;
            let value = match item {
                DataItem::Value(v) => self.data_value(q, field, v)?,
                DataItem::Raw(raw) => raw.clone(),
                DataItem::Inc(step) => format!("{key} + {step}"),
                DataItem::Dec(step) => format!("{key} - {step}"),
                DataItem::Invalid(msg) => return Err(SqlError::data(msg.clone())),
            };
            out.push((key, value));
        }
        Ok(out)
    }

    fn data_value(&mut self, q: &Query, field: &str, value: &Value) -> SqlResult<String> {
        match value {
            Value::Sub(_) => Err(SqlError::data(format!(
                "subquery values are not supported in data assignments ({field})"
            ))),
            Value::Expr(e) => Ok(e.as_str().to_string()),
            Value::List(_) => {
                if q.json_fields.contains_key(field) {
                    Ok(self.binds.bind(Value::Str(value.to_json().to_string())))
                } else {
                    Err(SqlError::data(format!(
                        "list value for non-JSON column {field}"
                    )))
                }
            }
            other => Ok(self.binds.bind(other.clone())),
        }
    }

    // ==================== Conditions ====================

    fn compile_tree(&mut self, q: &Query, tree: &ConditionTree) -> SqlResult<String> {
        let mut out = String::new();
        for (logic, nodes) in tree.groups() {
            let mut parts = Vec::new();
            for node in nodes {
                let sql = self.compile_node(q, node)?;
                if !sql.is_empty() {
                    parts.push(sql);
                }
            }
            if parts.is_empty() {
                continue;
            }
            let clause = parts.join(&format!(" {} ", logic.keyword()));
            if out.is_empty() {
                out = clause;
            } else {
                out.push(' ');
                out.push_str(logic.keyword());
                out.push(' ');
                out.push_str(&clause);
            }
        }
        Ok(out)
    }

    fn compile_node(&mut self, q: &Query, node: &ConditionNode) -> SqlResult<String> {
        match node {
            ConditionNode::Item {
                field,
                op,
                value,
                combinator,
            } => self.where_item(q, field, op, value, *combinator),
            ConditionNode::Multi {
                field,
                items,
                combinator,
            } => {
                let mut parts = Vec::new();
                for (op, value) in items {
                    parts.push(self.where_item(q, field, op, value, None)?);
                }
                Ok(format!(
                    "({})",
                    parts.join(&format!(" {} ", combinator.keyword()))
                ))
            }
            ConditionNode::Column { field, op, other } => {
                let oper = Operator::parse(op)
                    .filter(Operator::is_comparison)
                    .ok_or_else(|| SqlError::column(op.clone()))?;
                Ok(format!(
                    "({} {} {})",
                    self.key(q, field)?,
                    oper.sql(),
                    self.key(q, other)?
                ))
            }
            ConditionNode::Raw { sql, binds } => {
                Ok(format!("({})", self.binds.bind_positional(sql, binds)))
            }
            ConditionNode::Nested(sub) => {
                let child = sub.apply(q.child_for_group());
                let inner = self.compile_tree(&child, child.tree())?;
                if inner.is_empty() {
                    Ok(String::new())
                } else {
                    Ok(format!("({inner})"))
                }
            }
        }
    }

    // Fields joined with `|` or `&` expand into a parenthesized group over
    // each field, same operator and value.
    fn where_item(
        &mut self,
        q: &Query,
        field: &str,
        op: &str,
        value: &Value,
        combinator: Option<Logic>,
    ) -> SqlResult<String> {
        if field.contains('|') {
            let mut parts = Vec::new();
            for f in field.split('|') {
                parts.push(self.where_single(q, f.trim(), op, value, combinator)?);
            }
            return Ok(format!("({})", parts.join(" OR ")));
        }
        if field.contains('&') {
            let mut parts = Vec::new();
            for f in field.split('&') {
                parts.push(self.where_single(q, f.trim(), op, value, combinator)?);
            }
            return Ok(format!("({})", parts.join(" AND ")));
        }
        self.where_single(q, field, op, value, combinator)
    }

    fn where_single(
        &mut self,
        q: &Query,
        field: &str,
        op: &str,
        value: &Value,
        combinator: Option<Logic>,
    ) -> SqlResult<String> {
        let Some(oper) = Operator::parse(op) else {
            let upper = op.trim().to_ascii_uppercase();
            let key = self.key(q, field)?;
            if let Some(compiled) =
                q.dialect()
                    .compile_extended(&key, &upper, value, &mut self.binds)
            {
                return compiled;
            }
            return Err(SqlError::malformed(format!("unsupported operator: {op}")));
        };

        if matches!(oper, Operator::Exists | Operator::NotExists) {
            let sym = oper.sql();
            return match value {
                Value::Sub(sub) => Ok(format!("{sym} ({})", self.subquery(q, sub)?)),
                Value::Expr(e) => Ok(format!("{sym} ({})", e.as_str())),
                _ => Err(SqlError::malformed(
                    "EXISTS requires a subquery or trusted fragment",
                )),
            };
        }

        let key = self.key(q, field)?;
        let sql = match oper {
            Operator::Eq
            | Operator::Ne
            | Operator::Gt
            | Operator::Ge
            | Operator::Lt
            | Operator::Le => {
                let sym = oper.sql();
                match value {
                    Value::Null if oper == Operator::Eq => format!("{key} IS NULL"),
                    Value::Null if oper == Operator::Ne => format!("{key} IS NOT NULL"),
                    Value::Sub(sub) => format!("{key} {sym} ({})", self.subquery(q, sub)?),
                    Value::Expr(e) => format!("{key} {sym} {}", e.as_str()),
                    other => format!("{key} {sym} {}", self.binds.bind(other.clone())),
                }
            }
            Operator::Like | Operator::NotLike => {
                let sym = oper.sql();
                match value {
                    Value::List(items) => {
                        let joiner = combinator.unwrap_or(Logic::Or).keyword();
                        let parts = items
                            .iter()
                            .map(|item| {
                                format!("{key} {sym} {}", self.binds.bind(item.clone()))
                            })
                            .collect::<Vec<_>>();
                        format!("({})", parts.join(&format!(" {joiner} ")))
                    }
                    other => format!("{key} {sym} {}", self.binds.bind(other.clone())),
                }
            }
            Operator::In | Operator::NotIn => {
                let sym = oper.sql();
                match value {
                    Value::Sub(sub) => format!("{key} {sym} ({})", self.subquery(q, sub)?),
                    Value::Expr(e) => format!("{key} {sym} {}", e.as_str()),
                    _ => {
                        let mut seen: Vec<String> = Vec::new();
                        let mut placeholders = Vec::new();
                        for item in value.clone().into_list() {
                            let literal = item.literal();
                            if seen.contains(&literal) {
                                continue;
                            }
                            seen.push(literal);
                            placeholders.push(self.binds.bind(item));
                        }
                        if placeholders.is_empty() {
                            // An empty candidate list matches nothing.
                            format!("{key} {sym} ('')")
                        } else {
                            format!("{key} {sym} ({})", placeholders.join(","))
                        }
                    }
                }
            }
            Operator::Between | Operator::NotBetween => {
                let sym = oper.sql();
                let items = value.clone().into_list();
                if items.len() != 2 {
                    return Err(SqlError::malformed(format!(
                        "BETWEEN requires exactly two values for {key}"
                    )));
                }
                let low = self.binds.bind(items[0].clone());
                let high = self.binds.bind(items[1].clone());
                format!("{key} {sym} {low} AND {high}")
            }
            Operator::Null | Operator::NotNull => format!("{key} {}", oper.sql()),
            Operator::Exp => match value {
                Value::Expr(e) => format!("({key} {})", e.as_str()),
                Value::Str(s) => format!("({key} {s})"),
                _ => {
                    return Err(SqlError::malformed(format!(
                        "EXP requires a trusted fragment for {key}"
                    )));
                }
            },
            Operator::GtTime | Operator::GeTime | Operator::LtTime | Operator::LeTime => {
                let point = self.time_point(q, value, false);
                format!("{key} {} {}", oper.sql(), self.binds.bind(point))
            }
            Operator::BetweenTime | Operator::NotBetweenTime => {
                let sym = oper.sql();
                let (start, end) = self.time_range(q, &key, value)?;
                let low = self.binds.bind(start);
                let high = self.binds.bind(end);
                format!("{key} {sym} {low} AND {high}")
            }
            Operator::Exists | Operator::NotExists => unreachable!("handled above"),
        };
        Ok(sql)
    }

    fn time_point(&self, q: &Query, value: &Value, end: bool) -> Value {
        match value {
            Value::Str(s) => {
                if let Some((start, stop)) = q.resolve_time_rule(s) {
                    Value::Str(if end { stop } else { start })
                } else {
                    Value::Str(crate::time::normalize(s))
                }
            }
            Value::Int(ts) => Value::Str(
                crate::time::from_timestamp(*ts).unwrap_or_else(|| ts.to_string()),
            ),
            other => other.clone(),
        }
    }

    fn time_range(&self, q: &Query, key: &str, value: &Value) -> SqlResult<(Value, Value)> {
        if let Value::Str(s) = value {
            if let Some((start, end)) = q.resolve_time_rule(s) {
                return Ok((Value::Str(start), Value::Str(end)));
            }
        }
        let items = value.clone().into_list();
        if items.len() != 2 {
            return Err(SqlError::malformed(format!(
                "BETWEEN over time requires two endpoints for {key}"
            )));
        }
        Ok((
            self.time_point(q, &items[0], false),
            self.time_point(q, &items[1], true),
        ))
    }

    fn subquery(&self, q: &Query, sub: &SubQuery) -> SqlResult<String> {
        let child = sub.apply(q.child_query());
        Ok(child.build_select()?.display())
    }
}

// Plain and aliased selections declare the writable column set; raw fragments
// declare nothing. No selection means no restriction.
fn declared_columns(q: &Query) -> Option<HashSet<&str>> {
    let mut cols = HashSet::new();
    for sel in &q.fields {
        match sel {
            FieldSel::Plain(f) | FieldSel::Alias(f, _) => {
                cols.insert(f.as_str());
            }
            FieldSel::Raw(_) => {}
        }
    }
    if cols.is_empty() { None } else { Some(cols) }
}

fn order_direction(dir: Option<&str>) -> SqlResult<String> {
    match dir {
        None => Ok(String::new()),
        Some(d) if d.eq_ignore_ascii_case("asc") || d.eq_ignore_ascii_case("desc") => {
            Ok(format!(" {d}"))
        }
        Some(d) => Err(SqlError::malformed(format!("invalid order direction: {d}"))),
    }
}

fn compile_having(q: &Query) -> String {
    match &q.having {
        Some(fragment) => format!(" HAVING {fragment}"),
        None => String::new(),
    }
}

fn compile_limit(q: &Query) -> String {
    if let Some(limit) = &q.limit {
        return format!(" LIMIT {limit}");
    }
    if let Some((page, per_page)) = q.page {
        return format!(" LIMIT {},{per_page}", (page - 1) * per_page);
    }
    String::new()
}

fn compile_lock(q: &Query) -> String {
    match &q.lock {
        Some(clause) => format!(" {clause}"),
        None => String::new(),
    }
}

fn compile_comment(q: &Query) -> String {
    match &q.comment {
        Some(text) => {
            let text = match text.find("*/") {
                Some(pos) => text[..pos].trim(),
                None => text.trim(),
            };
            format!(" /* {text} */")
        }
        None => String::new(),
    }
}

fn compile_force(q: &Query) -> String {
    match &q.force_index {
        Some(index) => format!(" FORCE INDEX ({index})"),
        None => String::new(),
    }
}

fn compile_ignore(q: &Query) -> String {
    match &q.ignore_index {
        Some(index) => format!(" IGNORE INDEX ({index})"),
        None => String::new(),
    }
}

fn compile_using(q: &Query) -> String {
    match &q.using {
        Some(table) => format!(" USING {table}"),
        None => String::new(),
    }
}
