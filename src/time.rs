use chrono::Utc;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current date as `YYYY-MM-DD`, used to stamp export filenames.
pub fn today_iso() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
