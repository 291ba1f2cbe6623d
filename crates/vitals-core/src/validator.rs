//! 健康记录验证模块
//!
//! 把操作员提交的原始输入转换为规范化的 [`HealthRecord`]。
//! 按字段顺序逐一检查，遇到第一个错误立即返回（fail-fast），
//! 顺序为：患者ID、收缩压、舒张压、体温、体重、身高、MMSE。

use crate::error::ValidationError;
use crate::models::{FieldName, HealthRecord, RawInput, RawNumber, TimestampChoice};
use crate::utils::{body_mass_index, round_to_tenth};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// 闭区间取值范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const SYSTOLIC_RANGE: FieldRange = FieldRange::new(50.0, 250.0);
pub const DIASTOLIC_RANGE: FieldRange = FieldRange::new(30.0, 150.0);
pub const TEMPERATURE_F_RANGE: FieldRange = FieldRange::new(90.0, 110.0);
pub const WEIGHT_KG_RANGE: FieldRange = FieldRange::new(1.0, 300.0);
pub const HEIGHT_CM_RANGE: FieldRange = FieldRange::new(50.0, 250.0);
pub const MMSE_SCORE_RANGE: FieldRange = FieldRange::new(0.0, 30.0);

/// 2^63，第一个无法用 i64 表示的正整数
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// 健康记录验证器
///
/// 无状态，可在多个调用方之间共享。
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// 验证原始输入，`Now` 模式使用当前墙钟时间
    pub fn validate(&self, raw: &RawInput) -> Result<HealthRecord, ValidationError> {
        self.validate_at(raw, Utc::now())
    }

    /// 验证原始输入，`Now` 模式使用给定的 `now`
    pub fn validate_at(
        &self,
        raw: &RawInput,
        now: DateTime<Utc>,
    ) -> Result<HealthRecord, ValidationError> {
        let result = self.build_record(raw, now);

        match &result {
            Ok(record) => debug!(
                patient_id = record.patient_id,
                bmi = record.bmi,
                "Health record validated"
            ),
            Err(e) => warn!(field = %e.field(), "Health record rejected: {}", e),
        }

        result
    }

    fn build_record(
        &self,
        raw: &RawInput,
        now: DateTime<Utc>,
    ) -> Result<HealthRecord, ValidationError> {
        let patient_id = self.validate_patient_id(raw.patient_id)?;
        let systolic = self.validate_integer(FieldName::Systolic, raw.systolic, SYSTOLIC_RANGE)?;
        let diastolic = self.validate_integer(FieldName::Diastolic, raw.diastolic, DIASTOLIC_RANGE)?;
        let temperature_f = round_to_tenth(self.validate_float(
            FieldName::TemperatureF,
            raw.temperature_f,
            TEMPERATURE_F_RANGE,
        )?);
        let weight_kg = self.validate_float(FieldName::WeightKg, raw.weight_kg, WEIGHT_KG_RANGE)?;
        let height_cm = self.validate_float(FieldName::HeightCm, raw.height_cm, HEIGHT_CM_RANGE)?;
        let mmse_score = self.validate_integer(FieldName::MmseScore, raw.mmse_score, MMSE_SCORE_RANGE)?;

        let created_at = match raw.created_at {
            TimestampChoice::Now => now,
            TimestampChoice::At(at) => at,
        };

        Ok(HealthRecord {
            patient_id,
            systolic,
            diastolic,
            temperature_f,
            weight_kg,
            height_cm,
            bmi: body_mass_index(weight_kg, height_cm),
            mmse_score,
            created_at,
        })
    }

    fn validate_patient_id(&self, value: RawNumber) -> Result<i64, ValidationError> {
        let id = match value {
            RawNumber::Integer(v) => v,
            RawNumber::Float(v) => {
                let whole = self.whole_number(FieldName::PatientId, v)?;
                // i64::MAX as f64 会进位到 2^63，上界必须用开区间
                if whole >= I64_UPPER_BOUND {
                    return Err(ValidationError::FieldOutOfRange {
                        field: FieldName::PatientId,
                        min: 1.0,
                        max: i64::MAX as f64,
                        got: v,
                    });
                }
                // 低于 i64::MIN 时饱和，随后按非正数拒绝
                whole as i64
            }
        };

        if id < 1 {
            return Err(ValidationError::NotPositive {
                field: FieldName::PatientId,
                got: id,
            });
        }
        Ok(id)
    }

    fn validate_integer(
        &self,
        field: FieldName,
        value: RawNumber,
        range: FieldRange,
    ) -> Result<i32, ValidationError> {
        let v = match value {
            RawNumber::Integer(v) => v as f64,
            RawNumber::Float(v) => self.whole_number(field, v)?,
        };
        self.check_range(field, v, range)?;
        // 范围已检查，落在 i32 内
        Ok(v as i32)
    }

    fn validate_float(
        &self,
        field: FieldName,
        value: RawNumber,
        range: FieldRange,
    ) -> Result<f64, ValidationError> {
        let v = value.as_f64();
        if !v.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        self.check_range(field, v, range)?;
        Ok(v)
    }

    fn whole_number(&self, field: FieldName, v: f64) -> Result<f64, ValidationError> {
        if !v.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if v.fract() != 0.0 {
            return Err(ValidationError::NotAnInteger { field, got: v });
        }
        Ok(v)
    }

    fn check_range(&self, field: FieldName, v: f64, range: FieldRange) -> Result<(), ValidationError> {
        if range.contains(v) {
            Ok(())
        } else {
            Err(ValidationError::FieldOutOfRange {
                field,
                min: range.min,
                max: range.max,
                got: v,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_input() -> RawInput {
        RawInput {
            patient_id: 7.into(),
            systolic: 120.into(),
            diastolic: 80.into(),
            temperature_f: 98.6.into(),
            weight_kg: 70.0.into(),
            height_cm: 170.0.into(),
            mmse_score: 25.into(),
            created_at: TimestampChoice::Now,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    fn expect_field(raw: &RawInput, field: FieldName) {
        let err = RecordValidator::new()
            .validate_at(raw, fixed_now())
            .expect_err("input should be rejected");
        assert_eq!(err.field(), field, "unexpected error: {}", err);
    }

    #[test]
    fn test_valid_input() {
        let record = RecordValidator::new()
            .validate_at(&valid_input(), fixed_now())
            .unwrap();

        assert_eq!(record.patient_id, 7);
        assert_eq!(record.systolic, 120);
        assert_eq!(record.diastolic, 80);
        assert_eq!(record.temperature_f, 98.6);
        assert_eq!(record.mmse_score, 25);
        assert_eq!(record.created_at, fixed_now());
        assert!((record.bmi - 70.0 / (1.7 * 1.7)).abs() < 1e-9);
        assert_eq!(record.bmi_display(), "24.2");
    }

    #[test]
    fn test_systolic_out_of_range() {
        let mut raw = valid_input();
        raw.systolic = 300.into();

        let err = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FieldOutOfRange {
                field: FieldName::Systolic,
                min: 50.0,
                max: 250.0,
                got: 300.0,
            }
        );
    }

    fn reject_with(mutate: impl FnOnce(&mut RawInput), field: FieldName) {
        let mut raw = valid_input();
        mutate(&mut raw);
        expect_field(&raw, field);
    }

    #[test]
    fn test_each_range_names_its_field() {
        reject_with(|r| r.systolic = 49.into(), FieldName::Systolic);
        reject_with(|r| r.diastolic = 151.into(), FieldName::Diastolic);
        reject_with(|r| r.diastolic = 29.into(), FieldName::Diastolic);
        reject_with(|r| r.temperature_f = 89.9.into(), FieldName::TemperatureF);
        reject_with(|r| r.temperature_f = 110.1.into(), FieldName::TemperatureF);
        reject_with(|r| r.weight_kg = 0.5.into(), FieldName::WeightKg);
        reject_with(|r| r.weight_kg = 300.5.into(), FieldName::WeightKg);
        reject_with(|r| r.height_cm = 0.0.into(), FieldName::HeightCm);
        reject_with(|r| r.height_cm = 251.0.into(), FieldName::HeightCm);
        reject_with(|r| r.mmse_score = (-1).into(), FieldName::MmseScore);
        reject_with(|r| r.mmse_score = 31.into(), FieldName::MmseScore);
    }

    #[test]
    fn test_range_boundaries_are_inclusive() {
        let mut raw = valid_input();
        raw.systolic = 50.into();
        raw.diastolic = 150.into();
        raw.temperature_f = 110.0.into();
        raw.weight_kg = 1.0.into();
        raw.height_cm = 250.0.into();
        raw.mmse_score = 0.into();

        assert!(RecordValidator::new().validate_at(&raw, fixed_now()).is_ok());
    }

    #[test]
    fn test_integer_fields_accept_whole_floats() {
        let mut raw = valid_input();
        raw.patient_id = 7.0.into();
        raw.systolic = 120.0.into();
        raw.mmse_score = 25.0.into();

        let record = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap();
        assert_eq!(record.patient_id, 7);
        assert_eq!(record.systolic, 120);
        assert_eq!(record.mmse_score, 25);
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        let mut raw = valid_input();
        raw.diastolic = 80.5.into();
        let err = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAnInteger {
                field: FieldName::Diastolic,
                got: 80.5
            }
        );
    }

    #[test]
    fn test_non_finite_values() {
        let mut raw = valid_input();
        raw.weight_kg = f64::NAN.into();
        let err = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite { field: FieldName::WeightKg });

        let mut raw = valid_input();
        raw.systolic = f64::INFINITY.into();
        expect_field(&raw, FieldName::Systolic);
    }

    #[test]
    fn test_patient_id_must_be_positive() {
        let mut raw = valid_input();
        raw.patient_id = 0.into();
        let err = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotPositive {
                field: FieldName::PatientId,
                got: 0
            }
        );
    }

    #[test]
    fn test_patient_id_beyond_i64_rejected() {
        let mut raw = valid_input();
        raw.patient_id = RawNumber::Float(2f64.powi(63));
        let err = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::FieldOutOfRange {
                field: FieldName::PatientId,
                ..
            }
        ));

        raw.patient_id = RawNumber::Float(1e300);
        expect_field(&raw, FieldName::PatientId);

        raw.patient_id = RawNumber::Float(-1e300);
        expect_field(&raw, FieldName::PatientId);

        // 2^62 可以精确表示
        raw.patient_id = RawNumber::Float(2f64.powi(62));
        let record = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap();
        assert_eq!(record.patient_id, 1i64 << 62);
    }

    #[test]
    fn test_fail_fast_reports_first_field() {
        let mut raw = valid_input();
        raw.systolic = 400.into();
        raw.mmse_score = 99.into();
        expect_field(&raw, FieldName::Systolic);
    }

    #[test]
    fn test_temperature_rounded_to_one_decimal() {
        let mut raw = valid_input();
        raw.temperature_f = 98.64.into();
        let record = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap();
        assert_eq!(record.temperature_f, 98.6);
    }

    #[test]
    fn test_explicit_timestamp_passes_through() {
        let past = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        let future = Utc.with_ymd_and_hms(2199, 1, 1, 0, 0, 0).unwrap();

        for at in [past, future] {
            let mut raw = valid_input();
            raw.created_at = TimestampChoice::At(at);
            let record = RecordValidator::new().validate_at(&raw, fixed_now()).unwrap();
            assert_eq!(record.created_at, at);
        }
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = RecordValidator::new();
        let raw = valid_input();

        let first = validator.validate(&raw).unwrap();
        let second = validator.validate(&raw).unwrap();
        assert!(second.created_at >= first.created_at);
        assert_eq!(
            HealthRecord {
                created_at: first.created_at,
                ..second
            },
            first
        );

        let at = fixed_now();
        assert_eq!(
            validator.validate_at(&raw, at).unwrap(),
            validator.validate_at(&raw, at).unwrap()
        );
    }
}
