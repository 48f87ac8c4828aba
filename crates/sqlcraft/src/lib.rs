//! # sqlcraft
//!
//! A fluent SQL statement compiler. A builder describes a query (target
//! table, conditions, joins, ordering, data to write); rendering compiles it
//! into dialect-specific SQL with a named parameter bind table, then
//! substitutes the parameters back in to produce a fully-literal statement
//! for inspection and logging.
//!
//! ```ignore
//! use sqlcraft::Query;
//!
//! let sql = Query::new()
//!     .table("user")
//!     .where_cond("id", ">", 1)
//!     .where_eq("name", "alice")
//!     .select_sql()?;
//! assert_eq!(sql, "SELECT * FROM user WHERE id > 1 AND name = 'alice'");
//! # Ok::<(), sqlcraft::SqlError>(())
//! ```
//!
//! Conditions live in three logic groups (AND, OR, XOR) that always emit in
//! that order; operators accept the historical shorthand aliases (`eq`,
//! `egt`, `notin`, ...); values may be scalars, lists, trusted fragments
//! ([`Expr`]) or deferred subqueries. The dialect seam ([`Dialect`]) carries
//! identifier resolution, verb templates and operator extensions; [`Mysql`]
//! is the default.

pub mod bind;
pub mod builder;
pub mod condition;
pub mod error;
pub mod expr;
pub mod operator;
pub mod prelude;
pub mod query;
pub mod time;
pub mod value;

pub use bind::BindTable;
pub use builder::dialect::{Dialect, KeyContext};
pub use builder::mysql::Mysql;
pub use builder::Statement;
pub use condition::{ConditionNode, ConditionTree, Logic};
pub use error::{SqlError, SqlResult};
pub use expr::Expr;
pub use operator::Operator;
pub use query::{JoinType, Query};
pub use value::{SubQuery, Value};
