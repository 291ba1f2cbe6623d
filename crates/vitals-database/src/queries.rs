//! 数据库查询操作

use crate::connection::DatabasePool;
use crate::models::*;
use vitals_core::{RecordId, StoreError, StoreResult, StoredRecord};

/// 健康记录表名，写入与浏览使用同一张表
pub const HEALTH_RECORDS_TABLE: &str = "health_records";

const RECORD_COLUMNS: &str = "id, patient_id, systolic, diastolic, temperature_f, weight_kg, \
     height_cm, bmi, mmse_score, created_at, inserted_at";

/// 索引建表语句
fn index_statements(unique_patient_id: bool) -> Vec<String> {
    let table = HEALTH_RECORDS_TABLE;
    let mut indexes = vec![
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_patient_id ON {table}(patient_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at)"),
    ];
    if unique_patient_id {
        indexes.push(format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_{table}_patient_id ON {table}(patient_id)"
        ));
    }
    indexes
}

/// 数据库查询操作接口
pub struct DatabaseQueries<'a> {
    pool: &'a DatabasePool,
}

impl<'a> DatabaseQueries<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    ///
    /// `unique_patient_id` 为真时额外建立患者ID唯一索引，
    /// 重复写入会以约束冲突报告。
    pub async fn create_tables(&self, unique_patient_id: bool) -> StoreResult<()> {
        let pool = self.pool.pool();

        let ddl = format!(r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                patient_id BIGINT NOT NULL CHECK (patient_id > 0),
                systolic INTEGER NOT NULL,
                diastolic INTEGER NOT NULL,
                temperature_f DOUBLE PRECISION NOT NULL,
                weight_kg DOUBLE PRECISION NOT NULL,
                height_cm DOUBLE PRECISION NOT NULL,
                bmi DOUBLE PRECISION NOT NULL,
                mmse_score INTEGER NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL,
                inserted_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#, HEALTH_RECORDS_TABLE);

        sqlx::query(&ddl).execute(pool).await.map_err(StoreError::from)?;

        self.create_indexes(unique_patient_id).await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self, unique_patient_id: bool) -> StoreResult<()> {
        let pool = self.pool.pool();

        for index_sql in index_statements(unique_patient_id) {
            sqlx::query(&index_sql)
                .execute(pool)
                .await
                .map_err(StoreError::from)?;
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }

    /// 写入一条健康记录，返回数据库中的完整行
    pub async fn insert_record(&self, record: &NewHealthRecord) -> StoreResult<StoredRecord> {
        let pool = self.pool.pool();

        let sql = format!(
            "INSERT INTO {} (patient_id, systolic, diastolic, temperature_f, weight_kg, height_cm, bmi, mmse_score, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            HEALTH_RECORDS_TABLE, RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, DbHealthRecord>(&sql)
            .bind(record.patient_id)
            .bind(record.systolic)
            .bind(record.diastolic)
            .bind(record.temperature_f)
            .bind(record.weight_kg)
            .bind(record.height_cm)
            .bind(record.bmi)
            .bind(record.mmse_score)
            .bind(record.created_at)
            .fetch_one(pool)
            .await
            .map_err(StoreError::from)?;

        Ok(StoredRecord::from(row))
    }

    /// 获取全部记录，顺序由数据库决定
    pub async fn list_records(&self) -> StoreResult<Vec<StoredRecord>> {
        let pool = self.pool.pool();

        let sql = format!("SELECT {} FROM {}", RECORD_COLUMNS, HEALTH_RECORDS_TABLE);
        let results = sqlx::query_as::<_, DbHealthRecord>(&sql)
            .fetch_all(pool)
            .await
            .map_err(StoreError::from)?;

        Ok(results.into_iter().map(StoredRecord::from).collect())
    }

    /// 根据记录ID查找
    pub async fn get_record_by_id(&self, id: RecordId) -> StoreResult<Option<StoredRecord>> {
        let pool = self.pool.pool();

        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            RECORD_COLUMNS, HEALTH_RECORDS_TABLE
        );
        let result = sqlx::query_as::<_, DbHealthRecord>(&sql)
            .bind(id.0)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::from)?;

        Ok(result.map(StoredRecord::from))
    }

    /// 根据患者ID查找全部记录
    pub async fn get_records_by_patient_id(&self, patient_id: i64) -> StoreResult<Vec<StoredRecord>> {
        let pool = self.pool.pool();

        let sql = format!(
            "SELECT {} FROM {} WHERE patient_id = $1 ORDER BY created_at DESC",
            RECORD_COLUMNS, HEALTH_RECORDS_TABLE
        );
        let results = sqlx::query_as::<_, DbHealthRecord>(&sql)
            .bind(patient_id)
            .fetch_all(pool)
            .await
            .map_err(StoreError::from)?;

        Ok(results.into_iter().map(StoredRecord::from).collect())
    }
}
