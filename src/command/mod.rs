//! Command family catalog and placeholder policy
//!
//! Model skeleton -> CommandSkeleton -> CommandFamily -> canonical template
//! with `<field>` placeholders and a fixed required-field set.

pub mod catalog;
pub mod placeholder;
pub mod resolver;

pub use catalog::{CommandFamily, CATALOG};
pub use resolver::CommandSkeleton;
