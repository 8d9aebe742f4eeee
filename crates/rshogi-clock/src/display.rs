//! 表示用の時間文字列
//!
//! 残り時間は秒に切り上げ（0.001 秒残っていれば 1 秒と表示）、
//! 考慮時間は秒に切り捨てる。

/// ミリ秒 → 秒（切り上げ）
#[inline]
pub const fn ceil_secs(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

/// ミリ秒 → 秒（切り捨て）
#[inline]
pub const fn floor_secs(ms: u64) -> u64 {
    ms / 1000
}

/// 秒数を `HH:MM:SS` で表す。100 時間以上は桁が増える。
pub fn format_hms(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// 秒数を `MM:SS` で表す。60 分以上は分がそのまま増える。
pub fn format_ms(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
