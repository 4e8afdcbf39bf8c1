//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod dimension_queries;
mod novel_queries;
mod session_queries;

pub mod handlers;

pub use dimension_queries::*;
pub use novel_queries::*;
pub use session_queries::*;
