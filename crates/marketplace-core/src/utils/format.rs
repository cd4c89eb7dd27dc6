use std::cmp::Ordering;

/// Case-insensitive substring match.
/// `query` is expected to be lowercased already.
pub fn contains_ignore_case(haystack: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(query)
}

/// Compare two strings ignoring ASCII case, without allocating
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
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

/// Parse a decimal price as sent by the backend ("12.50" or 12.5).
/// Returns None for anything that is not a finite number.
pub fn parse_price(price: &str) -> Option<f64> {
    price.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Format a price string for display, falling back to the raw value
pub fn format_price(price: &str) -> String {
    match parse_price(price) {
        Some(value) => format!("${:.2}", value),
        None => price.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Linen Shirt", "linen"));
        assert!(contains_ignore_case("Linen Shirt", "shirt"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Linen Shirt", "wool"));
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("apple", "Apple"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("apple", "Banana"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Zucchini", "banana"), Ordering::Greater);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_parse_and_format_price() {
        assert_eq!(parse_price("12.50"), Some(12.5));
        assert_eq!(parse_price(" 3 "), Some(3.0));
        assert_eq!(parse_price("free"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(format_price("4.5"), "$4.50");
        assert_eq!(format_price("n/a"), "n/a");
    }
}
