//! Label names to display colors.

/// Color used for labels without an entry in the table.
pub const FALLBACK_LABEL_COLOR: &str = "#95a5a6";

const LABEL_COLORS: &[(&str, &str)] = &[
    ("frontend", "#3498db"),
    ("backend", "#e74c3c"),
    ("design", "#2ecc71"),
    ("bug", "#f39c12"),
    ("feature", "#9b59b6"),
    ("documentation", "#34495e"),
    ("optimization", "#1abc9c"),
    ("mobile", "#e67e22"),
    ("ios", "#000000"),
    ("android", "#3ddc84"),
    ("marketing", "#e74c3c"),
    ("social", "#9b59b6"),
    ("campaign", "#e67e22"),
    ("email", "#3498db"),
    ("content", "#2ecc71"),
    ("security", "#c0392b"),
    ("responsive", "#f39c12"),
    ("database", "#8e44ad"),
    ("planning", "#34495e"),
    ("launch", "#e74c3c"),
    ("coordination", "#3498db"),
    ("development", "#2ecc71"),
];

/// Hex color for a label, case-insensitive.
pub fn label_color(label: &str) -> &'static str {
    let needle = label.trim().to_lowercase();
    LABEL_COLORS
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_LABEL_COLOR)
}

/// Normalise a label by trimming, lowercasing, and replacing spaces with hyphens.
pub fn normalise_label(s: &str) -> String {
    s.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Split comma-separated label inputs, normalise each, and drop duplicates.
/// First occurrence wins so display order follows input order.
pub fn split_and_normalise_labels<S: AsRef<str>>(inputs: &[S]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for raw in inputs {
        for part in raw.as_ref().split(',') {
            let label = normalise_label(part);
            if !label.is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_ignore_case() {
        assert_eq!(label_color("frontend"), "#3498db");
        assert_eq!(label_color("Security"), "#c0392b");
        assert_eq!(label_color("  iOS "), "#000000");
    }

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(label_color("misc"), FALLBACK_LABEL_COLOR);
        assert_eq!(label_color(""), FALLBACK_LABEL_COLOR);
    }

    #[test]
    fn labels_are_normalised_and_deduplicated() {
        let labels = split_and_normalise_labels(&["Backend, bug", "backend", " Code Review "]);
        assert_eq!(labels, vec!["backend", "bug", "code-review"]);
        assert!(split_and_normalise_labels(&[" , "]).is_empty());
    }
}
