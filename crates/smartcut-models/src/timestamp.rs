//! Timestamp parsing and formatting.
//!
//! Supports `HH:MM:SS[.mmm]`, `MM:SS[.mmm]`, and plain `SS[.mmm]` forms,
//! which is what the CLI accepts for removal intervals.

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use smartcut_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let parse_part = |name: &'static str, s: &str| -> Result<f64, TimestampError> {
        let value: f64 = s
            .parse()
            .map_err(|_| TimestampError::InvalidValue(name, s.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        Ok(value)
    };

    match parts.len() {
        1 => parse_part("seconds", parts[0]),
        2 => {
            let minutes = parse_part("minutes", parts[0])?;
            let seconds = parse_part("seconds", parts[1])?;
            Ok(minutes * 60.0 + seconds)
        }
        3 => {
            let hours = parse_part("hours", parts[0])?;
            let minutes = parse_part("minutes", parts[1])?;
            let seconds = parse_part("seconds", parts[2])?;
            Ok(hours * 3600.0 + minutes * 60.0 + seconds)
        }
        _ => Err(TimestampError::InvalidFormat(ts.to_string())),
    }
}

/// Format seconds into HH:MM:SS or HH:MM:SS.mmm.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,
    #[error("Timestamp cannot be negative")]
    Negative,
    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, MM:SS, or SS")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(parse_timestamp("01:30:45").unwrap(), 5445.0);
        assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
        assert_eq!(parse_timestamp("90").unwrap(), 90.0);
        let ms = parse_timestamp("00:00:30.500").unwrap();
        assert!((ms - 30.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_timestamp_errors() {
        assert!(matches!(parse_timestamp(""), Err(TimestampError::Empty)));
        assert!(matches!(
            parse_timestamp("abc"),
            Err(TimestampError::InvalidValue(_, _))
        ));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("-5"),
            Err(TimestampError::Negative) | Err(TimestampError::InvalidValue(_, _))
        ));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(90.0), "00:01:30");
        assert_eq!(format_seconds(3661.0), "01:01:01");
        assert_eq!(format_seconds(30.5), "00:00:30.500");
    }
}
