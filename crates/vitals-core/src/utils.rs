//! 通用工具函数

/// 计算体重指数
///
/// 身高不大于 0 时返回 0.0，不视为错误。
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm > 0.0 {
        let height_m = height_cm / 100.0;
        weight_kg / (height_m * height_m)
    } else {
        0.0
    }
}

/// 四舍五入到一位小数
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
