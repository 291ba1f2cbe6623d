//! 错误定义模块

use crate::models::FieldName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 字段验证错误
///
/// 每个变体都携带出错字段，调用方可以直接定位到需要修改的输入项。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("字段 {field} 超出范围: 允许 {min}..={max}, 实际 {got}")]
    FieldOutOfRange {
        field: FieldName,
        min: f64,
        max: f64,
        got: f64,
    },

    #[error("字段 {field} 必须为整数, 实际 {got}")]
    NotAnInteger { field: FieldName, got: f64 },

    #[error("字段 {field} 不是有限数值")]
    NotFinite { field: FieldName },

    #[error("字段 {field} 必须为正整数, 实际 {got}")]
    NotPositive { field: FieldName, got: i64 },
}

impl ValidationError {
    /// 出错的字段
    pub fn field(&self) -> FieldName {
        match self {
            ValidationError::FieldOutOfRange { field, .. }
            | ValidationError::NotAnInteger { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::NotPositive { field, .. } => *field,
        }
    }
}

/// 存储错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreErrorKind {
    /// 后端不可达或超时，调用方可重试
    RemoteUnavailable,
    /// 违反存储端约束，不修改输入则不可重试
    ConstraintViolation,
    /// 其他错误，原始信息原样保留
    Unknown,
}

impl std::fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreErrorKind::RemoteUnavailable => write!(f, "RemoteUnavailable"),
            StoreErrorKind::ConstraintViolation => write!(f, "ConstraintViolation"),
            StoreErrorKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// 存储层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("存储错误 [{kind}]: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::RemoteUnavailable, message)
    }

    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::ConstraintViolation, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unknown, message)
    }

    /// 只有后端不可用属于瞬时故障
    pub fn is_retryable(&self) -> bool {
        self.kind == StoreErrorKind::RemoteUnavailable
    }
}

/// 服务端主动断开或拒绝新连接的 SQLSTATE，稍后重试可恢复
///
/// 53300 too_many_connections, 57P01 admin_shutdown,
/// 57P02 crash_shutdown, 57P03 cannot_connect_now
#[cfg(feature = "database")]
const TRANSIENT_SQLSTATES: &[&str] = &["53300", "57P01", "57P02", "57P03"];

#[cfg(feature = "database")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::remote_unavailable(err.to_string()),
            sqlx::Error::Database(db_err)
                if db_err
                    .code()
                    .map_or(false, |code| TRANSIENT_SQLSTATES.contains(&code.as_ref())) =>
            {
                StoreError::remote_unavailable(err.to_string())
            }
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                StoreError::constraint_violation(err.to_string())
            }
            // 23502: not_null_violation
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23502") => {
                StoreError::constraint_violation(err.to_string())
            }
            _ => StoreError::unknown(err.to_string()),
        }
    }
}

/// 存储层结果类型
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// 系统统一错误类型
#[derive(Error, Debug)]
pub enum VitalsError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("验证错误: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("查询参数无效: {0}")]
    InvalidQuery(String),
}

impl VitalsError {
    /// 输入问题（可由操作员修正）与后端问题分开报告
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            VitalsError::Validation(_) | VitalsError::InvalidQuery(_)
        )
    }
}

/// 系统统一结果类型
pub type Result<T> = std::result::Result<T, VitalsError>;
