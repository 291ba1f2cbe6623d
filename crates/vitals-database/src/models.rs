//! 数据库模型

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use vitals_core::models::*;

/// 数据库健康记录表
#[derive(Debug, FromRow)]
pub struct DbHealthRecord {
    pub id: i64,
    pub patient_id: i64,
    pub systolic: i32,
    pub diastolic: i32,
    pub temperature_f: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub mmse_score: i32,
    pub created_at: DateTime<Utc>,
    pub inserted_at: DateTime<Utc>,
}

impl From<DbHealthRecord> for StoredRecord {
    fn from(row: DbHealthRecord) -> Self {
        StoredRecord {
            id: RecordId(row.id),
            record: HealthRecord {
                patient_id: row.patient_id,
                systolic: row.systolic,
                diastolic: row.diastolic,
                temperature_f: row.temperature_f,
                weight_kg: row.weight_kg,
                height_cm: row.height_cm,
                bmi: row.bmi,
                mmse_score: row.mmse_score,
                created_at: row.created_at,
            },
            inserted_at: row.inserted_at,
        }
    }
}

// 插入模型 - id 和 inserted_at 由数据库生成

/// 新健康记录插入模型
#[derive(Debug)]
pub struct NewHealthRecord {
    pub patient_id: i64,
    pub systolic: i32,
    pub diastolic: i32,
    pub temperature_f: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub mmse_score: i32,
    pub created_at: DateTime<Utc>,
}

impl NewHealthRecord {
    pub fn from_record(record: &HealthRecord) -> Self {
        Self {
            patient_id: record.patient_id,
            systolic: record.systolic,
            diastolic: record.diastolic,
            temperature_f: record.temperature_f,
            weight_kg: record.weight_kg,
            height_cm: record.height_cm,
            bmi: record.bmi,
            mmse_score: record.mmse_score,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_row_conversion() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let inserted_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 6).unwrap();

        let stored = StoredRecord::from(DbHealthRecord {
            id: 11,
            patient_id: 7,
            systolic: 118,
            diastolic: 76,
            temperature_f: 98.2,
            weight_kg: 64.0,
            height_cm: 160.0,
            bmi: 25.0,
            mmse_score: 29,
            created_at,
            inserted_at,
        });

        assert_eq!(stored.id, RecordId(11));
        assert_eq!(stored.record.patient_id, 7);
        assert_eq!(stored.record.blood_pressure_display(), "118/76");
        assert_eq!(stored.record.created_at, created_at);
        assert_eq!(stored.inserted_at, inserted_at);

        let new_row = NewHealthRecord::from_record(&stored.record);
        assert_eq!(new_row.bmi, 25.0);
        assert_eq!(new_row.mmse_score, 29);
    }
}
