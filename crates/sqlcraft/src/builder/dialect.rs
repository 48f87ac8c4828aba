//! Dialect seam: identifier resolution, verb templates and operator
//! extensions.

use std::collections::HashMap;

use crate::bind::BindTable;
use crate::error::SqlResult;
use crate::value::Value;

/// Per-statement context consulted while resolving identifiers.
pub struct KeyContext<'a> {
    /// Primary table, substituted for the `__TABLE__` placeholder.
    pub table: Option<&'a str>,
    /// Table-to-alias map; a qualified key's table segment is rewritten to
    /// its alias when one is registered.
    pub aliases: &'a HashMap<String, String>,
    /// Prefix applied to unqualified keys (view-style inherited context).
    pub via: Option<&'a str>,
    /// Whether keys must match the identifier-safe pattern.
    pub strict: bool,
}

/// A SQL dialect.
///
/// The compiler owns clause assembly; dialects contribute identifier
/// resolution, the verb templates and any operators beyond the common set.
pub trait Dialect: std::fmt::Debug {
    /// Dialect name for diagnostics.
    fn name(&self) -> &'static str;

    /// Resolve a field or table key to its SQL form.
    ///
    /// The default passes the trimmed key through untouched.
    fn parse_key(&self, key: &str, _ctx: &KeyContext<'_>) -> SqlResult<String> {
        Ok(key.trim().to_string())
    }

    fn select_template(&self) -> &'static str {
        "SELECT%DISTINCT% %FIELD% FROM %TABLE%%FORCE%%IGNORE%%JOIN%%WHERE%%GROUP%%HAVING%%UNION%%ORDER%%LIMIT%%LOCK%%COMMENT%"
    }

    fn insert_template(&self) -> &'static str {
        "%INSERT% INTO %TABLE% (%FIELD%) VALUES (%DATA%)%COMMENT%"
    }

    fn update_template(&self) -> &'static str {
        "UPDATE %TABLE% SET %SET%%JOIN%%WHERE%%ORDER%%LIMIT%%LOCK%%COMMENT%"
    }

    fn delete_template(&self) -> &'static str {
        "DELETE FROM %TABLE%%USING%%JOIN%%WHERE%%ORDER%%LIMIT%%LOCK%%COMMENT%"
    }

    /// Expression producing a random sort order.
    fn random_order(&self) -> &'static str;

    /// JSON member access expression.
    fn json_extract(&self, field: &str, path: &str) -> String {
        format!("json_extract({field}, '$.{path}')")
    }

    /// JSON member assignment expression; `value` is a placeholder.
    fn json_set(&self, field: &str, path: &str, value: &str) -> String {
        format!("json_set({field}, '$.{path}', {value})")
    }

    /// Compile an operator outside the common set.
    ///
    /// `op` arrives trimmed and upper-cased. Returning `None` lets the
    /// compiler report the operator as malformed.
    fn compile_extended(
        &self,
        _key: &str,
        _op: &str,
        _value: &Value,
        _binds: &mut BindTable,
    ) -> Option<SqlResult<String>> {
        None
    }
}
