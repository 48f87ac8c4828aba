//! Parameter binding and debug substitution.

use crate::value::Value;

/// An ordered table of named bind parameters.
///
/// Auto-generated names are `b1`, `b2`, ... in order of first use. A fresh
/// table is created for every render, so rendering the same builder twice
/// never accumulates parameters.
#[derive(Clone, Debug, Default)]
pub struct BindTable {
    entries: Vec<(String, Value)>,
    auto: usize,
}

impl BindTable {
    /// Create an empty bind table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under the next auto-generated name and return its
    /// placeholder (`:bN`).
    pub fn bind(&mut self, value: Value) -> String {
        self.auto += 1;
        let name = format!("b{}", self.auto);
        let placeholder = format!(":{name}");
        self.entries.push((name, value));
        placeholder
    }

    /// Bind a value under an explicit name and return its placeholder.
    ///
    /// Names are kept unique per statement: a clashing name gets a numeric
    /// suffix.
    pub fn bind_named(&mut self, name: &str, value: Value) -> String {
        let mut unique = name.to_string();
        let mut n = 1;
        while self.entries.iter().any(|(k, _)| k == &unique) {
            n += 1;
            unique = format!("{name}_{n}");
        }
        let placeholder = format!(":{unique}");
        self.entries.push((unique, value));
        placeholder
    }

    /// Replace each `?` in a trusted fragment with a fresh named placeholder,
    /// binding the supplied values positionally.
    pub fn bind_positional(&mut self, sql: &str, values: &[Value]) -> String {
        let mut out = String::with_capacity(sql.len());
        let mut next = values.iter();
        for ch in sql.chars() {
            if ch == '?' {
                if let Some(value) = next.next() {
                    out.push_str(&self.bind(value.clone()));
                    continue;
                }
            }
            out.push(ch);
        }
        out
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in bind order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Substitute every placeholder with its literal rendering.
    ///
    /// Longer names substitute first so `:b1` never clobbers `:b10`.
    pub fn apply(&self, sql: &str) -> String {
        let mut ordered: Vec<&(String, Value)> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        let mut out = sql.to_string();
        for (name, value) in ordered {
            out = out.replace(&format!(":{name}"), &value.literal());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_names_in_order() {
        let mut binds = BindTable::new();
        assert_eq!(binds.bind(Value::Int(1)), ":b1");
        assert_eq!(binds.bind(Value::from("x")), ":b2");
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn named_binds_stay_unique() {
        let mut binds = BindTable::new();
        assert_eq!(binds.bind_named("id", Value::Int(1)), ":id");
        assert_eq!(binds.bind_named("id", Value::Int(2)), ":id_2");
    }

    #[test]
    fn apply_substitutes_literals() {
        let mut binds = BindTable::new();
        let p1 = binds.bind(Value::Int(1));
        let p2 = binds.bind(Value::from("alice"));
        let sql = format!("id = {p1} AND name = {p2}");
        assert_eq!(binds.apply(&sql), "id = 1 AND name = 'alice'");
    }

    #[test]
    fn apply_handles_prefix_collisions() {
        let mut binds = BindTable::new();
        let mut placeholders = Vec::new();
        for i in 1..=12 {
            placeholders.push(binds.bind(Value::Int(i)));
        }
        let sql = placeholders.join(",");
        assert_eq!(binds.apply(&sql), "1,2,3,4,5,6,7,8,9,10,11,12");
    }

    #[test]
    fn positional_binds() {
        let mut binds = BindTable::new();
        let sql = binds.bind_positional("id = ? AND name = ?", &[Value::Int(7), Value::from("x")]);
        assert_eq!(sql, "id = :b1 AND name = :b2");
        assert_eq!(binds.apply(&sql), "id = 7 AND name = 'x'");
    }
}
