//! Parameters Context - 小说参数限界上下文
//!
//! 职责:
//! - 设置向导提交的小说参数
//! - 滑块、枚举选项等值对象
//! - 角色设定

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::NovelParameters;
pub use entities::{ArcType, Character, CharacterRole};
pub use errors::ParameterError;
pub use value_objects::{
    ChapterStructure, ConflictType, NovelLength, PointOfView, ResolutionStyle, Slider,
};
