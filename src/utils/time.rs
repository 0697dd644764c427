use chrono::{DateTime, Utc};

/// Current wall-clock time as milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A token is expired once its expiry instant is at or before `now_ms`.
/// Tokens without a recorded expiry are treated as valid.
pub fn is_expired(expiry_ms: Option<i64>, now_ms: i64) -> bool {
    match expiry_ms {
        Some(expiry) => expiry <= now_ms,
        None => false,
    }
}

/// Expiry instant for a token granted at `now_ms` and valid for `expires_in` seconds
pub fn expiry_after(now_ms: i64, expires_in: i64) -> i64 {
    now_ms.saturating_add(expires_in.saturating_mul(1000))
}

/// Render an epoch-millisecond instant for log lines
pub fn format_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| format!("{}ms", ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired() {
        let now = 1_772_000_000_000;

        assert!(is_expired(Some(now - 1), now)); // already past
        assert!(is_expired(Some(now), now)); // exactly now
        assert!(!is_expired(Some(now + 1), now)); // still valid
        assert!(!is_expired(None, now)); // no expiry recorded
    }

    #[test]
    fn test_expiry_after() {
        assert_eq!(expiry_after(1_000, 3599), 3_600_000);
        assert_eq!(expiry_after(i64::MAX, 10), i64::MAX);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_now_is_recent() {
        // 2024-01-01T00:00:00Z
        assert!(now_millis() > 1_704_067_200_000);
    }
}
