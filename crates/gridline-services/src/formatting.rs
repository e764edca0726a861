//! Display formatting of cell values

use gridline_core::Value;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text shown for a value in rendered rows and text exports.
///
/// NULL renders empty and enums render their label (or case).
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Enum(e) => e.display_label().to_string(),
        Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        Value::DateTimeUtc(dt) => dt.format(DATETIME_FORMAT).to_string(),
        Value::Bytes(bytes) => hex::encode(bytes),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gridline_core::EnumValue;

    #[test]
    fn test_null_is_empty() {
        assert_eq!(format_value(&Value::Null), "");
    }

    #[test]
    fn test_enum_uses_label() {
        let labeled = Value::Enum(EnumValue::new("Status", "paid").with_label("Paid"));
        let bare = Value::Enum(EnumValue::new("Status", "open"));
        assert_eq!(format_value(&labeled), "Paid");
        assert_eq!(format_value(&bare), "open");
    }

    #[test]
    fn test_datetime_format() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(14, 5, 0))
            .unwrap();
        assert_eq!(format_value(&Value::DateTime(dt)), "2024-03-09 14:05:00");
    }

    #[test]
    fn test_scalars_use_display() {
        assert_eq!(format_value(&Value::Int64(42)), "42");
        assert_eq!(format_value(&Value::Bool(true)), "true");
        assert_eq!(format_value(&Value::Bytes(vec![0xab, 0x01])), "ab01");
    }
}
