use chrono::{DateTime, Utc};

/// Current UTC time in milliseconds, the storage format of every timestamp.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Converts stored milliseconds back into a UTC instant; out-of-range values clamp to the epoch.
#[must_use]
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_trip() {
        let now = now_millis();
        assert_eq!(from_millis(now).timestamp_millis(), now);
        assert_eq!(from_millis(0).to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }
}
