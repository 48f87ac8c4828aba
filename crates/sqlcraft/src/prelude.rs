//! Convenience re-exports.
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//! ```

pub use crate::bind::BindTable;
pub use crate::builder::dialect::Dialect;
pub use crate::builder::mysql::Mysql;
pub use crate::builder::Statement;
pub use crate::condition::Logic;
pub use crate::error::{SqlError, SqlResult};
pub use crate::expr::Expr;
pub use crate::query::{JoinType, Query};
pub use crate::value::Value;
