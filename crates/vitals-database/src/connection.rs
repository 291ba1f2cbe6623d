//! 数据库连接管理

use crate::config::StoreConfig;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;
use vitals_core::{Result, StoreError, VitalsError};

/// 数据库连接池
///
/// 进程启动时创建一次，显式传给存储实现。
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// 建立连接池并验证至少一个连接可用
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = Self::connect_options(config)?;
        let pool = Self::pool_options(config)
            .connect_with(options)
            .await
            .map_err(StoreError::from)?;

        info!(max_connections = config.max_connections, "Database pool connected");
        Ok(Self { pool })
    }

    /// 创建连接池，首次使用时才建立连接
    pub fn connect_lazy(config: &StoreConfig) -> Result<Self> {
        let options = Self::connect_options(config)?;
        let pool = Self::pool_options(config).connect_lazy_with(options);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }

    fn connect_options(config: &StoreConfig) -> Result<PgConnectOptions> {
        config.validate()?;
        let options: PgConnectOptions = config
            .endpoint
            .parse()
            .map_err(|e: sqlx::Error| VitalsError::Config(format!("invalid store endpoint: {}", e)))?;
        Ok(options.password(&config.credential))
    }

    fn pool_options(config: &StoreConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
    }
}
