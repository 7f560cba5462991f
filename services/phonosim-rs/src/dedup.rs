//! Collapse enumerated combinations that select the same segments.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::classes::ClassMap;

/// Keep the first entry for every distinct member list.
///
/// Member lists compare by value, including order. Walking in map order
/// means the representative vector of each class is the first one the
/// enumerator produced for it.
pub fn deduplicate(classes: &ClassMap) -> ClassMap {
    let mut seen: FxHashSet<&[String]> = FxHashSet::default();
    let unique: ClassMap = classes
        .iter()
        .filter(|class| seen.insert(class.members.as_slice()))
        .cloned()
        .collect();

    debug!(
        before = classes.len(),
        after = unique.len(),
        "deduplicated natural classes"
    );
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NaturalClass;

    fn map(entries: &[(&str, Vec<&str>)]) -> ClassMap {
        entries
            .iter()
            .map(|(key, members)| {
                NaturalClass::new(
                    key.parse().unwrap(),
                    members.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_first_seen_wins() {
        let input = map(&[
            ("[+, +]", vec!["b"]),
            ("[+, -]", vec!["p"]),
            ("[+, 0]", vec!["p", "b"]),
            ("[0, +]", vec!["b"]),
            ("[0, 0]", vec!["p", "b"]),
        ]);
        let unique = deduplicate(&input);
        let keys: Vec<String> = unique.iter().map(|c| c.vector.to_string()).collect();
        assert_eq!(keys, ["[+, +]", "[+, -]", "[+, 0]"]);
    }

    #[test]
    fn test_member_order_matters() {
        let input = map(&[("[+]", vec!["p", "b"]), ("[0]", vec!["b", "p"])]);
        assert_eq!(deduplicate(&input).len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let input = map(&[
            ("[+]", vec!["p"]),
            ("[-]", vec!["b"]),
            ("[0]", vec!["p"]),
        ]);
        let once = deduplicate(&input);
        assert_eq!(deduplicate(&once), once);
    }
}
