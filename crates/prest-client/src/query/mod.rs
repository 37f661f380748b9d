//! The query builder.
//!
//! A [`QueryBuilder`] collects clauses for one request and renders them into
//! a URL whose query string lists every fragment in the order the clauses
//! were added.
//!
//! # Submodules
//!
//! - [`clause`]: clause types and their query string fragments.
//! - [`builder`]: the chainable builder and its execution.
//! - [`output`]: decoding of the response body.

pub mod builder;
pub mod clause;
pub mod output;

pub use builder::QueryBuilder;
pub use clause::{Aggregate, AggregateFn, Clause, FilterOp, JoinKind, Renderer};
pub use output::QueryOutput;
