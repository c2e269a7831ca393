//! Placeholder token syntax.

/// Opens a placeholder.
pub const PLACEHOLDER_START: &str = "$D{";

/// Closes a placeholder.
pub const PLACEHOLDER_END: &str = "}";

const PATH_SEPARATORS: [char; 3] = [',', ';', ':'];

/// The parsed body of a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    /// Packaging / type name, `jar` when omitted.
    pub packaging: String,
    pub classifier: Option<String>,
    /// Join character of a transitive placeholder.
    pub separator: Option<char>,
}

impl DependencySpec {
    /// Parse `g:a[:v[:packaging[:classifier]]]` with an optional trailing separator.
    ///
    /// Empty segments are dropped. Returns `None` with fewer than two segments.
    pub fn parse(token: &str) -> Option<Self> {
        let separator = token.chars().last().filter(|c| PATH_SEPARATORS.contains(c));
        let body = match separator {
            Some(c) => &token[..token.len() - c.len_utf8()],
            None => token,
        };

        let parts: Vec<&str> = body.split(':').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            return None;
        }

        Some(DependencySpec {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts.get(2).map(|v| v.to_string()),
            packaging: parts.get(3).map_or_else(|| "jar".to_string(), |p| p.to_string()),
            classifier: parts.get(4).map(|c| c.to_string()),
            separator,
        })
    }

    pub fn is_transitive(&self) -> bool {
        self.separator.is_some()
    }
}

/// Byte ranges `(start, end)` of the first placeholder at or after `from`.
///
/// `start` is the index of the opening delimiter, `end` the index just
/// past the closing one. Placeholders do not nest.
pub fn next_placeholder(value: &str, from: usize) -> Option<(usize, usize)> {
    let start = from + value.get(from..)?.find(PLACEHOLDER_START)?;
    let body = start + PLACEHOLDER_START.len();
    let close = body + value[body..].find(PLACEHOLDER_END)?;
    Some((start, close + PLACEHOLDER_END.len()))
}

/// The text between the delimiters of a placeholder span.
pub fn placeholder_body(value: &str, span: (usize, usize)) -> &str {
    &value[span.0 + PLACEHOLDER_START.len()..span.1 - PLACEHOLDER_END.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_token() {
        let spec = DependencySpec::parse("org.lib:lib:2.0:test-jar:tests").unwrap();
        assert_eq!(spec.group_id, "org.lib");
        assert_eq!(spec.artifact_id, "lib");
        assert_eq!(spec.version.as_deref(), Some("2.0"));
        assert_eq!(spec.packaging, "test-jar");
        assert_eq!(spec.classifier.as_deref(), Some("tests"));
        assert!(!spec.is_transitive());
    }

    #[test]
    fn test_parse_transitive_separators() {
        let spec = DependencySpec::parse("g:a:1.0:jar:,").unwrap();
        assert_eq!(spec.separator, Some(','));
        assert_eq!(spec.packaging, "jar");
        assert_eq!(spec.classifier, None);

        let spec = DependencySpec::parse("g:a;").unwrap();
        assert_eq!(spec.separator, Some(';'));
        assert_eq!(spec.version, None);

        // a trailing colon is the separator, not an empty segment
        let spec = DependencySpec::parse("g:a:1.0:").unwrap();
        assert_eq!(spec.separator, Some(':'));
        assert_eq!(spec.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_parse_rejects_short_specs() {
        assert_eq!(DependencySpec::parse(""), None);
        assert_eq!(DependencySpec::parse("g"), None);
        assert_eq!(DependencySpec::parse("g::,"), None);
    }

    #[test]
    fn test_next_placeholder() {
        let value = "a $D{g:a} b $D{x:y,} c $D{open";
        let first = next_placeholder(value, 0).unwrap();
        assert_eq!(placeholder_body(value, first), "g:a");

        let second = next_placeholder(value, first.1).unwrap();
        assert_eq!(placeholder_body(value, second), "x:y,");

        assert_eq!(next_placeholder(value, second.1), None);
        assert_eq!(next_placeholder("plain", 0), None);
    }
}
