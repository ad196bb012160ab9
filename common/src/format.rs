//! 表示用フォーマット
//!
//! パーセント表示は必ず値域にクランプしてから整形する。
//! 有限でない値（NaN, ∞）は「データなし」として `None` を返す。

/// 0.0-1.0 のスコアをクランプ
pub fn clamp_unit(score: f64) -> Option<f64> {
    score.is_finite().then(|| score.clamp(0.0, 1.0))
}

/// 0-100 のパーセント値をクランプ
pub fn clamp_percent(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}

/// 0.0-1.0 のスコアを `12.0%` 形式に整形
pub fn format_unit_percent(score: f64) -> Option<String> {
    clamp_unit(score).map(|s| format!("{:.1}%", round_half_up(s * 100.0, 1)))
}

/// 既にパーセント単位の値を `87.5%` 形式に整形
pub fn format_percent(value: f64) -> Option<String> {
    clamp_percent(value).map(|v| format!("{:.1}%", round_half_up(v, 1)))
}

/// バイト数をKB表記（小数2桁）に整形
pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:.2} KB", round_half_up(bytes as f64 / 1024.0, 2))
}

/// 小数 `digits` 桁で四捨五入（0.5 は切り上げ）
///
/// `format!` の丸めは丁度の中間値を偶数側に寄せるので、先に丸めておく。
fn round_half_up(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// 転送済みバイト数から進捗率を計算（0-100、四捨五入）
///
/// `total` が0の場合は計算できないので `None`。
pub fn progress_percent(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let loaded = loaded.min(total) as f64;
    let percent = (loaded * 100.0 / total as f64).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// 整数値は小数点なしで表示
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
