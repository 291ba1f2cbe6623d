//! 记录存储接口
//!
//! [`RecordStore`] 是验证之后的持久化边界：单行原子写入、全量读取、按ID查找。
//! 本层不做重试，也不保留跨调用状态。

use crate::connection::DatabasePool;
use crate::models::NewHealthRecord;
use crate::queries::DatabaseQueries;
use async_trait::async_trait;
use tracing::{debug, error, info};
use vitals_core::{HealthRecord, RecordId, StoreResult, StoredRecord};

/// 记录存储接口
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 写入一条记录，返回存储端分配了ID和写入时间的行
    async fn insert(&self, record: &HealthRecord) -> StoreResult<StoredRecord>;

    /// 全部记录，不保证顺序，不分页
    async fn list_all(&self) -> StoreResult<Vec<StoredRecord>>;

    /// 按存储ID查找，不存在时返回 `Ok(None)`
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<StoredRecord>>;

    /// 按患者ID查找
    async fn find_by_patient_id(&self, patient_id: i64) -> StoreResult<Vec<StoredRecord>>;
}

/// PostgreSQL 记录存储
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: DatabasePool,
}

impl PgRecordStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn queries(&self) -> DatabaseQueries<'_> {
        DatabaseQueries::new(&self.pool)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &HealthRecord) -> StoreResult<StoredRecord> {
        let new_record = NewHealthRecord::from_record(record);
        match self.queries().insert_record(&new_record).await {
            Ok(stored) => {
                info!(
                    record_id = %stored.id,
                    patient_id = stored.record.patient_id,
                    "Health record inserted"
                );
                Ok(stored)
            }
            Err(e) => {
                error!(patient_id = record.patient_id, kind = %e.kind, "Insert failed: {}", e.message);
                Err(e)
            }
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<StoredRecord>> {
        let rows = self.queries().list_records().await.map_err(|e| {
            error!(kind = %e.kind, "List failed: {}", e.message);
            e
        })?;
        debug!("Fetched {} health records", rows.len());
        Ok(rows)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<StoredRecord>> {
        self.queries().get_record_by_id(id).await.map_err(|e| {
            error!(record_id = %id, kind = %e.kind, "Lookup failed: {}", e.message);
            e
        })
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> StoreResult<Vec<StoredRecord>> {
        self.queries()
            .get_records_by_patient_id(patient_id)
            .await
            .map_err(|e| {
                error!(patient_id, kind = %e.kind, "Patient lookup failed: {}", e.message);
                e
            })
    }
}
