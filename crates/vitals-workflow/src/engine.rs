//! 录入工作流引擎
//!
//! 串联验证器和记录存储，提供录入、浏览和查询三个操作

use crate::view::{RecordListing, RecordView};
use serde::Serialize;
use std::sync::Arc;
use vitals_core::{HealthRecord, RawInput, RecordId, RecordValidator, Result, StoredRecord, VitalsError};
use vitals_database::RecordStore;

/// 录入成功回执
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub stored: StoredRecord,
    pub view: RecordView,
}

/// 录入工作流引擎
///
/// 存储由调用方在进程启动时创建并注入。
pub struct HealthDataWorkflow {
    validator: RecordValidator,
    store: Arc<dyn RecordStore>,
}

impl HealthDataWorkflow {
    /// 创建新的工作流引擎
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            validator: RecordValidator::new(),
            store,
        }
    }

    /// 验证原始输入，不访问存储
    pub fn validate(&self, raw: &RawInput) -> Result<HealthRecord> {
        Ok(self.validator.validate(raw)?)
    }

    /// 录入一条记录
    ///
    /// 验证失败时不会调用存储。
    pub async fn submit_record(&self, raw: &RawInput) -> Result<SubmissionReceipt> {
        let record = self.validate(raw)?;
        self.persist(&record).await
    }

    /// 写入已验证的记录
    pub async fn persist(&self, record: &HealthRecord) -> Result<SubmissionReceipt> {
        tracing::info!("Submitting health record for patient {}", record.patient_id);

        let stored = self.store.insert(record).await?;
        let view = RecordView::from(&stored);

        tracing::info!(
            "Health record {} stored for patient {} (BMI {})",
            stored.id, stored.record.patient_id, view.bmi
        );
        Ok(SubmissionReceipt { stored, view })
    }

    /// 刷新浏览列表
    pub async fn refresh_list(&self) -> Result<RecordListing> {
        let records = self.store.list_all().await?;
        let listing = RecordListing::from_records(records);

        if listing.is_empty() {
            tracing::info!("No health records found");
        } else {
            tracing::info!(
                "Loaded {} health records (average MMSE {:?})",
                listing.total_records, listing.average_mmse
            );
        }
        Ok(listing)
    }

    /// 按记录ID查询
    pub async fn search_by_id(&self, id: i64) -> Result<Option<StoredRecord>> {
        let id = Self::positive_id("record id", id)?;
        let found = self.store.find_by_id(RecordId(id)).await?;

        if found.is_none() {
            tracing::warn!("No record found with ID: {}", id);
        }
        Ok(found)
    }

    /// 按患者ID查询
    pub async fn search_by_patient(&self, patient_id: i64) -> Result<Vec<StoredRecord>> {
        let patient_id = Self::positive_id("patient id", patient_id)?;
        let found = self.store.find_by_patient_id(patient_id).await?;

        if found.is_empty() {
            tracing::warn!("No record found for patient ID: {}", patient_id);
        } else {
            tracing::debug!("Found {} records for patient {}", found.len(), patient_id);
        }
        Ok(found)
    }

    fn positive_id(label: &str, id: i64) -> Result<i64> {
        if id > 0 {
            Ok(id)
        } else {
            Err(VitalsError::InvalidQuery(format!(
                "{} must be positive, got {}",
                label, id
            )))
        }
    }
}
