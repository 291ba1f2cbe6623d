//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 记录字段名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    PatientId,
    Systolic,
    Diastolic,
    TemperatureF,
    WeightKg,
    HeightCm,
    Bmi,
    MmseScore,
    CreatedAt,
}

impl FieldName {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::PatientId => "patient_id",
            FieldName::Systolic => "systolic",
            FieldName::Diastolic => "diastolic",
            FieldName::TemperatureF => "temperature_f",
            FieldName::WeightKg => "weight_kg",
            FieldName::HeightCm => "height_cm",
            FieldName::Bmi => "bmi",
            FieldName::MmseScore => "mmse_score",
            FieldName::CreatedAt => "created_at",
        }
    }

}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 原始数值输入
///
/// 表单控件可能把整数字段以浮点数提交，由验证器统一转换。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Integer(i64),
    Float(f64),
}

impl RawNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            RawNumber::Integer(v) => v as f64,
            RawNumber::Float(v) => v,
        }
    }
}

impl From<i64> for RawNumber {
    fn from(v: i64) -> Self {
        RawNumber::Integer(v)
    }
}

impl From<i32> for RawNumber {
    fn from(v: i32) -> Self {
        RawNumber::Integer(v as i64)
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Float(v)
    }
}

/// 创建时间的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampChoice {
    /// 验证时取当前时间
    #[default]
    Now,
    /// 使用调用方给定的时间，不做范围检查
    At(DateTime<Utc>),
}

/// 操作员提交的原始输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub patient_id: RawNumber,
    pub systolic: RawNumber,
    pub diastolic: RawNumber,
    pub temperature_f: RawNumber,
    pub weight_kg: RawNumber,
    pub height_cm: RawNumber,
    pub mmse_score: RawNumber,
    #[serde(default)]
    pub created_at: TimestampChoice,
}

/// 经过验证的健康检查记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub patient_id: i64,
    pub systolic: i32,           // mmHg
    pub diastolic: i32,          // mmHg
    pub temperature_f: f64,      // 华氏度，一位小数
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,                // 由体重和身高推导，完整精度
    pub mmse_score: i32,         // 0-30
    pub created_at: DateTime<Utc>,
}

impl HealthRecord {
    /// 血压展示格式 "收缩压/舒张压"
    pub fn blood_pressure_display(&self) -> String {
        format!("{}/{}", self.systolic, self.diastolic)
    }

    /// BMI 展示值，保留一位小数
    pub fn bmi_display(&self) -> String {
        format!("{:.1}", self.bmi)
    }

    /// 按字段取数值，非数值字段返回 None
    pub fn numeric_value(&self, field: FieldName) -> Option<f64> {
        match field {
            FieldName::PatientId => Some(self.patient_id as f64),
            FieldName::Systolic => Some(self.systolic as f64),
            FieldName::Diastolic => Some(self.diastolic as f64),
            FieldName::TemperatureF => Some(self.temperature_f),
            FieldName::WeightKg => Some(self.weight_kg),
            FieldName::HeightCm => Some(self.height_cm),
            FieldName::Bmi => Some(self.bmi),
            FieldName::MmseScore => Some(self.mmse_score as f64),
            FieldName::CreatedAt => None,
        }
    }
}

/// 存储端分配的主键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 已持久化的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: HealthRecord,
    pub inserted_at: DateTime<Utc>,
}

/// 对已取回的记录求某一数值字段的平均值
///
/// 记录为空或字段不是数值时返回 `None`。
pub fn average(rows: &[StoredRecord], field: FieldName) -> Option<f64> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.record.numeric_value(field))
        .collect();

    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> HealthRecord {
        HealthRecord {
            patient_id: 7,
            systolic: 120,
            diastolic: 80,
            temperature_f: 98.6,
            weight_kg: 70.0,
            height_cm: 170.0,
            bmi: 70.0 / (1.7 * 1.7),
            mmse_score: 25,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_display_projections() {
        let record = sample_record();
        assert_eq!(record.blood_pressure_display(), "120/80");
        assert_eq!(record.bmi_display(), "24.2");
    }

    #[test]
    fn test_numeric_value() {
        let record = sample_record();
        assert_eq!(record.numeric_value(FieldName::MmseScore), Some(25.0));
        assert_eq!(record.numeric_value(FieldName::Systolic), Some(120.0));
        assert_eq!(record.numeric_value(FieldName::CreatedAt), None);
    }

    #[test]
    fn test_field_name_matches_serde_name() {
        for field in [
            FieldName::PatientId,
            FieldName::TemperatureF,
            FieldName::MmseScore,
            FieldName::CreatedAt,
        ] {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
            assert_eq!(field.to_string(), field.as_str());
        }
    }

    fn stored(id: i64, mmse_score: i32, systolic: i32) -> StoredRecord {
        StoredRecord {
            id: RecordId(id),
            record: HealthRecord {
                patient_id: id,
                systolic,
                mmse_score,
                ..sample_record()
            },
            inserted_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_average_empty() {
        assert_eq!(average(&[], FieldName::MmseScore), None);
    }

    #[test]
    fn test_average_values() {
        let rows = vec![stored(1, 24, 110), stored(2, 27, 130), stored(3, 30, 150)];
        assert_eq!(average(&rows, FieldName::MmseScore), Some(27.0));
        assert_eq!(average(&rows, FieldName::Systolic), Some(130.0));
    }

    #[test]
    fn test_average_non_numeric_field() {
        let rows = vec![stored(1, 24, 110)];
        assert_eq!(average(&rows, FieldName::CreatedAt), None);
    }

    #[test]
    fn test_raw_input_from_json() {
        let json = r#"{
            "patient_id": 7,
            "systolic": 120.0,
            "diastolic": 80,
            "temperature_f": 98.6,
            "weight_kg": 70,
            "height_cm": 170.0,
            "mmse_score": 25
        }"#;
        let raw: RawInput = serde_json::from_str(json).unwrap();
        assert_eq!(raw.patient_id, RawNumber::Integer(7));
        assert_eq!(raw.systolic, RawNumber::Float(120.0));
        assert_eq!(raw.created_at, TimestampChoice::Now);
    }

    #[test]
    fn test_stored_record_serializes_flat() {
        let stored = StoredRecord {
            id: RecordId(42),
            record: sample_record(),
            inserted_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 31, 0).unwrap(),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], 42);
        assert_eq!(value["patient_id"], 7);
        assert_eq!(value["mmse_score"], 25);
    }
}
