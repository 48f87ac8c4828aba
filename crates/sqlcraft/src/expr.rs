//! Trusted raw SQL fragments.

/// A raw SQL fragment that bypasses identifier resolution and binding.
///
/// Wrapping a string in [`Expr`] marks it as trusted: the compiler emits it
/// verbatim and never creates a bind entry for it. Callers are responsible
/// for the fragment's safety.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr(String);

impl Expr {
    /// Wrap a trusted SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Expr(sql.into())
    }

    /// The wrapped fragment.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Expr {
    fn from(sql: &str) -> Self {
        Expr::new(sql)
    }
}

impl From<String> for Expr {
    fn from(sql: String) -> Self {
        Expr(sql)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
