//! Cleanup of free-form category and technology labels.

use std::collections::HashSet;

/// Maximum number of technology tags kept per listing.
pub const MAX_TECHNOLOGIES: usize = 20;

/// Collapses inner whitespace and trims a label.
pub fn clean_label(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans technology tags: trims, drops empties and case-insensitive
/// duplicates (first spelling wins), caps at [`MAX_TECHNOLOGIES`].
pub fn normalize_technologies(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();

    tags.iter()
        .map(|t| clean_label(t))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .take(MAX_TECHNOLOGIES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("  Landing   Page "), "Landing Page");
        assert_eq!(clean_label(""), "");
    }

    #[test]
    fn test_normalize_technologies_dedupes_case_insensitively() {
        let tags = vec![
            "React".to_string(),
            " react ".to_string(),
            "".to_string(),
            "Type  Script".to_string(),
            "Rust".to_string(),
        ];

        assert_eq!(
            normalize_technologies(&tags),
            vec!["React".to_string(), "Type Script".to_string(), "Rust".to_string()]
        );
    }

    #[test]
    fn test_normalize_technologies_caps_length() {
        let tags: Vec<String> = (0..50).map(|i| format!("tag{i}")).collect();
        assert_eq!(normalize_technologies(&tags).len(), MAX_TECHNOLOGIES);
    }
}
