use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Handles parsing timestamps from the formats found in Claude usage logs
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp string into a DateTime<Utc>
    /// Offsets and the Z suffix are honored; naive timestamps are read as host local time
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>> {
        let timestamp = timestamp_str.trim();

        // Try parsing as ISO 8601
        if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
            return Ok(dt.with_timezone(&Utc));
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, format) {
                if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                    return Ok(local.with_timezone(&Utc));
                }
            }
        }

        anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_z_suffix() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000Z").unwrap();
        assert_eq!(result.to_rfc3339(), "2024-01-01T12:00:00+00:00");
    }

    #[test]
    fn test_parse_timezone() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000+02:00").unwrap();
        assert_eq!(result.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_naive_is_local() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000").unwrap();
        let expected = Local
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(TimestampParser::parse("invalid").is_err());
        assert!(TimestampParser::parse("").is_err());
    }
}
