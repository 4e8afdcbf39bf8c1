//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod dimension_handlers;
mod novel_handlers;
mod session_handlers;

pub use dimension_handlers::*;
pub use novel_handlers::*;
pub use session_handlers::*;
