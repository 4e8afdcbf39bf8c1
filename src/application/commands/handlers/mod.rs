//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod chapter_handlers;
mod novel_handlers;
mod outline_handlers;
mod reference_handlers;

pub use chapter_handlers::*;
pub use novel_handlers::*;
pub use outline_handlers::*;
pub use reference_handlers::*;
