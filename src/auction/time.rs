//! 경매 남은 시간 / 날짜 표시
//!
//! 남은 시간은 호출 시점의 `now` 로부터 매번 다시 계산한다. 실시간 카운트다운이
//! 필요하면 호출자가 주기적으로 다시 호출해야 한다.

use chrono::{DateTime, Utc};

/// 종료된 경매 표시
pub const ENDED_MARKER: &str = "Auction ended";

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// 남은 시간 분해
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRemaining {
    pub total_ms: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    pub fn between(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total_ms = (ends_at - now).num_milliseconds();
        Self {
            total_ms,
            days: total_ms.div_euclid(MS_PER_DAY),
            hours: total_ms.div_euclid(MS_PER_HOUR).rem_euclid(24),
            minutes: total_ms.div_euclid(MS_PER_MINUTE).rem_euclid(60),
            seconds: total_ms.div_euclid(MS_PER_SECOND).rem_euclid(60),
        }
    }

    pub fn has_ended(&self) -> bool {
        self.total_ms <= 0
    }
}

/// 남은 시간 표시 (일 > 시간 > 분 순으로 단위 선택)
pub fn format_time_remaining(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let time = TimeRemaining::between(ends_at, now);

    if time.has_ended() {
        return ENDED_MARKER.to_string();
    }
    if time.days > 0 {
        return format!("{}d {}h", time.days, time.hours);
    }
    if time.hours > 0 {
        return format!("{}h {}m", time.hours, time.minutes);
    }
    format!("{}m {}s", time.minutes, time.seconds)
}

/// 입찰 시각 표시 (dd.mm.yy HH:MM)
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%d.%m.%y %H:%M").to_string()
}

/// 종료일 표시 (dd.mm.yy)
pub fn format_end_date(at: DateTime<Utc>) -> String {
    at.format("%d.%m.%y").to_string()
}
