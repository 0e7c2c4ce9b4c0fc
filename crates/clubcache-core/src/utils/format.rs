/// Format a phone number for display
/// Normalizes local (0xxxxxxxxx) and international (+84xxxxxxxxx) numbers
/// to 0XXX XXX XXX
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        10 if digits.starts_with('0') => digits,
        11 if digits.starts_with("84") => format!("0{}", &digits[2..]),
        _ => return phone.to_string(), // Return original if can't format
    };

    format!("{} {} {}", &local[0..4], &local[4..7], &local[7..10])
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%d/%m/%Y").to_string()
    } else if date.len() >= 10 {
        // Keep the YYYY-MM-DD prefix
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Human-readable age for a cached timestamp, in whole minutes
pub fn age_display(minutes: i64) -> String {
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("0901234567"), "0901 234 567");
        assert_eq!(format_phone("+84 901 234 567"), "0901 234 567");
        assert_eq!(format_phone("84-901-234-567"), "0901 234 567");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Nguyễn Văn An", 9), "Nguyễn...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T10:00:00+07:00"), "05/03/2024");
        assert_eq!(format_date("2024-03-05 10:00"), "2024-03-05");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Lan Tran", "tran"));
        assert!(!contains_ignore_case("Lan Tran", "minh"));
    }

    #[test]
    fn test_age_display() {
        assert_eq!(age_display(-2), "just now");
        assert_eq!(age_display(0), "just now");
        assert_eq!(age_display(5), "5m ago");
        assert_eq!(age_display(125), "2h ago");
        assert_eq!(age_display(3000), "2d ago");
    }
}
