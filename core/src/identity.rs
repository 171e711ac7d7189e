//! Heuristic entity identity.
//!
//! The source truncates and reformats display labels between renders, so
//! two labels are treated as the same entity when one canonical form
//! contains the other. The first-seen key always wins; a label matching
//! several known keys is resolved to the first and logged, since the
//! heuristic cannot tell same-surname entities apart.

use crate::roster::EntityKey;

/// Canonicalize a raw display label: strip quote characters, trim, lowercase.
pub fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '\'' && *c != '"')
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Resolve a raw label against the known key set.
///
/// Returns the matching known key when the normalized label contains, or is
/// contained by, that key. Otherwise the normalized label itself is the new
/// key; registration is the caller's job.
pub fn resolve<'a, I>(raw_label: &str, known_keys: I) -> EntityKey
where
    I: IntoIterator<Item = &'a EntityKey>,
{
    let normalized = normalize_label(raw_label);
    if normalized.is_empty() {
        return normalized;
    }

    let mut resolved: Option<&EntityKey> = None;
    for key in known_keys {
        if key.is_empty() {
            continue;
        }
        if key.contains(&normalized) || normalized.contains(key.as_str()) {
            match resolved {
                None => resolved = Some(key),
                Some(first) if first != key => {
                    tracing::debug!(
                        label = %normalized,
                        first = %first,
                        also = %key,
                        "ambiguous identity match, keeping first"
                    );
                }
                Some(_) => {}
            }
        }
    }

    resolved.cloned().unwrap_or(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<EntityKey> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn normalizes_quotes_whitespace_and_case() {
        assert_eq!(normalize_label("  \"Jane\" D'Oe  "), "jane doe");
        assert_eq!(normalize_label("BUSTER"), "buster");
    }

    #[test]
    fn truncated_label_resolves_to_known_key() {
        let known = keys(&["jane doe", "buster brown"]);
        assert_eq!(resolve("Jane D", known.iter()), "jane doe");
    }

    #[test]
    fn longer_label_resolves_to_shorter_known_key() {
        let known = keys(&["jane d"]);
        assert_eq!(resolve("Jane Doe", known.iter()), "jane d");
    }

    #[test]
    fn unknown_label_becomes_its_own_key() {
        let known = keys(&["jane doe"]);
        assert_eq!(resolve("Rex", known.iter()), "rex");
    }

    #[test]
    fn ambiguous_match_keeps_first_known_key() {
        let known = keys(&["john smith", "jane smith"]);
        assert_eq!(resolve("Smith", known.iter()), "john smith");
    }

    #[test]
    fn empty_label_never_matches() {
        let known = keys(&["jane doe"]);
        assert_eq!(resolve("  ''  ", known.iter()), "");
    }
}
