use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn unix_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}
