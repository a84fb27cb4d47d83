//! Criteria compilation and query execution.

pub mod compiler;
pub mod page;
pub mod predicate;
pub mod service;
pub mod value;

pub use compiler::compile;
pub use page::{Direction, Page, PageRequest, Sort};
pub use predicate::{Clause, Condition, Predicate};
pub use service::BarQueryService;
pub use value::Value;
