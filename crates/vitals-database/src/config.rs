//! 存储配置
//!
//! 连接地址和凭据来自配置文件（可选）与 `VITALS__` 前缀的环境变量，
//! 例如 `VITALS__STORE__ENDPOINT`、`VITALS__STORE__CREDENTIAL`。
//! 缺少任一项在建立连接前即报配置错误。

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use vitals_core::{Result, VitalsError};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "VITALS";

/// 存储连接配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// 数据库地址，如 `postgres://vitals@db.internal:5432/postgres`
    #[serde(default)]
    pub endpoint: String,
    /// 数据库密码
    #[serde(default)]
    pub credential: String,
    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 获取连接超时（秒）
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// 是否在存储端强制患者ID唯一
    #[serde(default)]
    pub enforce_unique_patient_id: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(default)]
    store: Option<StoreConfig>,
}

impl StoreConfig {
    pub fn new(endpoint: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: credential.into(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            enforce_unique_patient_id: false,
        }
    }

    /// 从配置文件和进程环境加载
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// 加载配置，`env` 为 `Some` 时替代进程环境
    pub fn load_with_env(
        config_path: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            debug!("Loading store configuration from {}", path);
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| VitalsError::Config(e.to_string()))?;

        let store = settings.store.ok_or_else(|| {
            VitalsError::Config(format!(
                "missing store settings, set {}__STORE__ENDPOINT and {}__STORE__CREDENTIAL",
                ENV_PREFIX, ENV_PREFIX
            ))
        })?;

        store.validate()?;
        info!(
            max_connections = store.max_connections,
            unique_patient_id = store.enforce_unique_patient_id,
            "Store configuration loaded"
        );
        Ok(store)
    }

    /// 检查必填项
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(VitalsError::Config(format!(
                "store endpoint is not set ({}__STORE__ENDPOINT)",
                ENV_PREFIX
            )));
        }
        if self.credential.trim().is_empty() {
            return Err(VitalsError::Config(format!(
                "store credential is not set ({}__STORE__CREDENTIAL)",
                ENV_PREFIX
            )));
        }
        if self.max_connections == 0 {
            return Err(VitalsError::Config(
                "store max_connections cannot be 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
