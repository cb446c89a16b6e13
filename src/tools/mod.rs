//! Tool registry and built-in business data tools.
//!
//! Every invocation goes through [`ToolRegistry::invoke`], which validates the
//! arguments before the handler runs and the handler's result after it
//! returns. Built-in tools are read-only.

mod business;
mod registry;

pub use business::{business_registry, company_matches, BusinessQuery, BusinessTool};
pub use registry::{ToolDefinition, ToolHandler, ToolRegistry};
