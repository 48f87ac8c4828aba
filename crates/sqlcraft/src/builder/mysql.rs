//! MySQL dialect.

use std::sync::LazyLock;

use regex::Regex;

use crate::bind::BindTable;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;

use super::dialect::{Dialect, KeyContext};

static SAFE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.*]+$").expect("hardcoded pattern"));

/// The MySQL dialect: strict identifier handling, `->` JSON access,
/// `rand()` ordering and the REGEXP operator pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mysql;

impl Mysql {
    fn resolve(&self, key: &str, ctx: &KeyContext<'_>) -> SqlResult<String> {
        let mut key = key.to_string();
        if !key.contains('.') && key != "*" {
            if let Some(via) = ctx.via {
                key = format!("{via}.{key}");
            }
        }
        if let Some((table, field)) = key.split_once('.') {
            let mut table = table;
            if table == "__TABLE__" {
                if let Some(primary) = ctx.table {
                    table = primary;
                }
            }
            let table = ctx.aliases.get(table).map(String::as_str).unwrap_or(table);
            key = format!("{table}.{field}");
        }
        if ctx.strict && !SAFE_KEY.is_match(&key) {
            return Err(SqlError::field(key));
        }
        Ok(key)
    }
}

impl Dialect for Mysql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn parse_key(&self, key: &str, ctx: &KeyContext<'_>) -> SqlResult<String> {
        let key = key.trim();
        if key.parse::<i64>().is_ok() || key.parse::<f64>().is_ok() {
            return Ok(key.to_string());
        }
        if key == "*" {
            return Ok(key.to_string());
        }
        if let Some((base, path)) = key.split_once("->") {
            let base = self.resolve(base.trim(), ctx)?;
            let path = path.trim();
            if ctx.strict && !SAFE_KEY.is_match(path) {
                return Err(SqlError::field(key.to_string()));
            }
            return Ok(self.json_extract(&base, path));
        }
        self.resolve(key, ctx)
    }

    // JOIN precedes SET so joined tables can be assigned in one statement.
    fn update_template(&self) -> &'static str {
        "UPDATE %TABLE%%JOIN% SET %SET%%WHERE%%ORDER%%LIMIT%%LOCK%%COMMENT%"
    }

    fn random_order(&self) -> &'static str {
        "rand()"
    }

    fn compile_extended(
        &self,
        key: &str,
        op: &str,
        value: &Value,
        binds: &mut BindTable,
    ) -> Option<SqlResult<String>> {
        let keyword = match op {
            "REGEXP" => "REGEXP",
            "NOT REGEXP" | "NOTREGEXP" => "NOT REGEXP",
            _ => return None,
        };
        let rhs = match value {
            Value::Expr(e) => e.as_str().to_string(),
            other => binds.bind(other.clone()),
        };
        Some(Ok(format!("{key} {keyword} {rhs}")))
    }
}
