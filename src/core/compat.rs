// ─── Version Compatibility ───
// Maps a target Minecraft version to the ordered set of versions a mod
// build is allowed to match.

use std::collections::HashMap;

/// Static lookup of game versions declared interchangeable for mod-build
/// purposes. Read-only at run time.
#[derive(Debug, Clone, Default)]
pub struct CompatTable {
    entries: HashMap<String, Vec<String>>,
}

impl CompatTable {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// The exact target first, then its declared compatible versions in
    /// table order, deduplicated. Unknown targets resolve to themselves.
    pub fn resolve(&self, target: &str) -> Vec<String> {
        let mut versions = vec![target.to_string()];
        if let Some(declared) = self.entries.get(target) {
            for version in declared {
                if !versions.iter().any(|known| known == version) {
                    versions.push(version.clone());
                }
            }
        }
        versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CompatTable {
        let mut entries = HashMap::new();
        entries.insert(
            "1.21".to_string(),
            vec![
                "1.21.1".to_string(),
                "1.21".to_string(),
                "1.21.1".to_string(),
            ],
        );
        CompatTable::new(entries)
    }

    #[test]
    fn unknown_version_resolves_to_itself() {
        assert_eq!(table().resolve("1.19.2"), vec!["1.19.2".to_string()]);
    }

    #[test]
    fn known_version_keeps_target_first_and_deduplicates() {
        let resolved = table().resolve("1.21");
        assert_eq!(
            resolved,
            vec!["1.21".to_string(), "1.21.1".to_string()]
        );
    }

    #[test]
    fn declared_order_is_preserved() {
        let mut entries = HashMap::new();
        entries.insert(
            "1.20.4".to_string(),
            vec!["1.20.3".to_string(), "1.20.2".to_string()],
        );
        let resolved = CompatTable::new(entries).resolve("1.20.4");
        assert_eq!(
            resolved,
            vec![
                "1.20.4".to_string(),
                "1.20.3".to_string(),
                "1.20.2".to_string()
            ]
        );
    }
}
