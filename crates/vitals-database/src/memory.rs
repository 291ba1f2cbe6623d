//! 内存记录存储
//!
//! 与 PostgreSQL 实现遵循同一契约，用于离线运行和测试。

use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use vitals_core::{HealthRecord, RecordId, StoreError, StoreResult, StoredRecord};

#[derive(Debug, Default)]
struct Inner {
    records: Vec<StoredRecord>,
    last_id: i64,
}

/// 内存记录存储
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
    unique_patient_id: bool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 重复的患者ID以约束冲突拒绝
    pub fn with_unique_patient_id() -> Self {
        Self {
            unique_patient_id: true,
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: &HealthRecord) -> StoreResult<StoredRecord> {
        // 检查与写入在同一把写锁下完成
        let mut inner = self.inner.write().await;

        if self.unique_patient_id
            && inner
                .records
                .iter()
                .any(|r| r.record.patient_id == record.patient_id)
        {
            warn!(patient_id = record.patient_id, "Duplicate patient id rejected");
            return Err(StoreError::constraint_violation(format!(
                "duplicate patient_id {}",
                record.patient_id
            )));
        }

        inner.last_id += 1;
        let stored = StoredRecord {
            id: RecordId(inner.last_id),
            record: record.clone(),
            inserted_at: Utc::now(),
        };
        inner.records.push(stored.clone());

        info!(
            record_id = %stored.id,
            patient_id = record.patient_id,
            "Health record inserted"
        );
        Ok(stored)
    }

    async fn list_all(&self) -> StoreResult<Vec<StoredRecord>> {
        Ok(self.inner.read().await.records.clone())
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<StoredRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> StoreResult<Vec<StoredRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.record.patient_id == patient_id)
            .cloned()
            .collect())
    }
}
