//! # Vitals工作流模块
//!
//! 提供健康数据录入的完整工作流，包括：
//! - 录入：验证原始输入并写入存储
//! - 浏览：获取全部记录及汇总统计
//! - 查询：按记录ID或患者ID查找

pub mod engine;
pub mod view;

// 重新导出主要类型
pub use engine::{HealthDataWorkflow, SubmissionReceipt};
pub use view::{RecordListing, RecordView};
