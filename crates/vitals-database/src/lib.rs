//! # Vitals数据库模块
//!
//! 负责健康检查记录的持久化，提供PostgreSQL连接池、记录存储接口及其实现。

pub mod config;
pub mod connection;
pub mod memory;
pub mod models;
pub mod queries;
pub mod store;

// 重新导出主要类型
pub use config::StoreConfig;
pub use connection::DatabasePool;
pub use memory::InMemoryRecordStore;
pub use models::*;
pub use queries::DatabaseQueries;
pub use store::{PgRecordStore, RecordStore};
