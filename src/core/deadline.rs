//! 关机截止时间计算
//!
//! 把用户选择的时:分换算成一个必定在将来的绝对时间点

use chrono::{DateTime, Duration, TimeZone};

use crate::core::types::TimeOfDay;

/// 计算下一次到达 `at` 的时间点
///
/// 以今天的 `at`（秒为0）作为候选；候选不晚于 `now` 时（相等也算已过）
/// 顺延到明天同一时刻。返回值总是严格晚于 `now`。
///
/// 候选时刻落在夏令时跳变的空隙里时，按墙钟差值从 `now` 推算。
pub fn compute_deadline<Tz: TimeZone>(now: &DateTime<Tz>, at: TimeOfDay) -> DateTime<Tz> {
    let today = now.date_naive();
    let mut candidate = today.and_time(at.naive_time());

    if candidate <= now.naive_local() {
        candidate += Duration::days(1);
    }

    match now.timezone().from_local_datetime(&candidate).earliest() {
        Some(deadline) if deadline > *now => deadline,
        _ => now.clone() + (candidate - now.naive_local()),
    }
}
