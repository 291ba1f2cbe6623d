//! 展示投影
//!
//! 存储行的只读副本，附带界面需要的格式化字段和汇总统计。

use chrono::{DateTime, Utc};
use serde::Serialize;
use vitals_core::{average, FieldName, RecordId, StoredRecord};

/// 单条记录的展示视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub id: RecordId,
    pub patient_id: i64,
    pub blood_pressure: String, // "收缩压/舒张压"
    pub temperature_f: String,  // 一位小数
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: String,            // 一位小数
    pub mmse_score: i32,
    pub created_at: DateTime<Utc>,
    pub inserted_at: DateTime<Utc>,
}

impl From<&StoredRecord> for RecordView {
    fn from(stored: &StoredRecord) -> Self {
        let record = &stored.record;
        RecordView {
            id: stored.id,
            patient_id: record.patient_id,
            blood_pressure: record.blood_pressure_display(),
            temperature_f: format!("{:.1}", record.temperature_f),
            weight_kg: record.weight_kg,
            height_cm: record.height_cm,
            bmi: record.bmi_display(),
            mmse_score: record.mmse_score,
            created_at: record.created_at,
            inserted_at: stored.inserted_at,
        }
    }
}

/// 浏览页结果
#[derive(Debug, Clone, Serialize)]
pub struct RecordListing {
    pub records: Vec<StoredRecord>,
    pub total_records: usize,
    pub average_mmse: Option<f64>,
}

impl RecordListing {
    pub fn from_records(records: Vec<StoredRecord>) -> Self {
        let average_mmse = average(&records, FieldName::MmseScore);
        Self {
            total_records: records.len(),
            average_mmse,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn views(&self) -> Vec<RecordView> {
        self.records.iter().map(RecordView::from).collect()
    }

    /// 平均 MMSE，一位小数
    pub fn average_mmse_display(&self) -> Option<String> {
        self.average_mmse.map(|avg| format!("{:.1}", avg))
    }
}
