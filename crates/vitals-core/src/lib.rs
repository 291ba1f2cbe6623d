//! # Vitals Core
//!
//! 健康检查记录系统的核心模块，提供数据模型、记录验证、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;
pub mod validator;

pub use error::{Result, StoreError, StoreErrorKind, StoreResult, ValidationError, VitalsError};
pub use models::*;
pub use validator::RecordValidator;
