//! Query construction
//!
//! - `operator`: closed operator set and wire suffixes
//! - `encoder`: query state and its canonical query string
//! - `builder`: deferred, chainable builder bound to one table

pub mod builder;
pub mod encoder;
pub mod operator;

pub use builder::{PreparedQuery, QueryBuilder, total_pages};
pub use encoder::{Predicate, QueryState, SortDirection, encode};
pub use operator::Operator;
