//! Deduplication of torrent search results by info_hash.

use std::collections::HashSet;

/// Deduplicate items by content identifier, keeping the first one seen.
///
/// Later items with an identifier that was already admitted are dropped even
/// if they would have ranked higher: output stability wins over optimality.
/// Input order is preserved for the survivors.
///
/// Returns the survivors and the number of dropped duplicates.
pub fn deduplicate_first_seen<T, F>(items: Vec<T>, info_hash: F) -> (Vec<T>, usize)
where
    F: Fn(&T) -> &str,
{
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut kept = Vec::with_capacity(items.len());
    let mut dropped = 0;

    for item in items {
        let hash = info_hash(&item).to_ascii_lowercase();
        if seen.insert(hash) {
            kept.push(item);
        } else {
            dropped += 1;
        }
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &'static str, hash: &'static str) -> (&'static str, &'static str) {
        (title, hash)
    }

    #[test]
    fn test_dedup_single_result() {
        let (kept, dropped) = deduplicate_first_seen(vec![item("Test", "abc123")], |i| i.1);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_dedup_first_seen_wins() {
        let items = vec![
            item("Test A", "ABC123"),
            item("Test B", "abc123"),
            item("Test C", "ABC123"),
        ];
        let (kept, dropped) = deduplicate_first_seen(items, |i| i.1);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0, "Test A");
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_dedup_preserves_input_order() {
        let items = vec![
            item("Low", "hash1"),
            item("High", "hash2"),
            item("Dup", "hash1"),
            item("Medium", "hash3"),
        ];
        let (kept, _) = deduplicate_first_seen(items, |i| i.1);

        let titles: Vec<_> = kept.iter().map(|i| i.0).collect();
        assert_eq!(titles, vec!["Low", "High", "Medium"]);
    }

    #[test]
    fn test_dedup_empty() {
        let (kept, dropped) = deduplicate_first_seen(Vec::<(&str, &str)>::new(), |i| i.1);
        assert!(kept.is_empty());
        assert_eq!(dropped, 0);
    }
}
