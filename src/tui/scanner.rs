//! Turns a keyspace snapshot into tree entries.

use crate::metadata::{Category, KeyspaceMetadata};

/// A path to insert into the tree: ancestor labels plus the final label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub parents: Vec<String>,
    pub label: String,
}

impl ScanEntry {
    fn new(parents: &[&str], label: &str) -> Self {
        Self {
            parents: parents.iter().map(|s| (*s).to_string()).collect(),
            label: label.to_string(),
        }
    }
}

/// Labels of the non-empty categories, in fixed priority order.
#[must_use]
pub fn categories(meta: &KeyspaceMetadata) -> Vec<&'static str> {
    Category::ALL
        .into_iter()
        .filter(|c| meta.count(*c) > 0)
        .map(Category::label)
        .collect()
}

/// Every category, entity and user-type field as tree entries.
///
/// Each category label comes first, followed by its entities; user types add one
/// entry per field below the type.
#[must_use]
pub fn entries(meta: &KeyspaceMetadata) -> Vec<ScanEntry> {
    let mut out = Vec::new();
    for label in categories(meta) {
        out.push(ScanEntry::new(&[], label));
        let Some(category) = Category::from_label(label) else {
            continue;
        };
        if category == Category::UserTypes {
            for udt in &meta.user_types {
                out.push(ScanEntry::new(&[label], &udt.name));
                for field in &udt.fields {
                    out.push(ScanEntry::new(&[label, udt.name.as_str()], field));
                }
            }
        } else {
            out.extend(meta.names(category).map(|name| ScanEntry::new(&[label], name)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::UserType;

    fn names(n: usize, prefix: &str) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_categories_skip_empty_collections() {
        let meta = KeyspaceMetadata {
            functions: names(3, "fn"),
            materialized_views: names(1, "mv"),
            ..KeyspaceMetadata::default()
        };
        assert_eq!(categories(&meta), vec!["Functions", "Views"]);
    }

    #[test]
    fn test_categories_full_order() {
        let meta = KeyspaceMetadata {
            tables: names(1, "t"),
            functions: names(1, "f"),
            aggregates: names(1, "a"),
            materialized_views: names(1, "v"),
            user_types: vec![UserType::default()],
            ..KeyspaceMetadata::default()
        };
        assert_eq!(
            categories(&meta),
            vec!["Tables", "Functions", "Aggregates", "Views", "UserTypes"]
        );
        assert!(categories(&KeyspaceMetadata::default()).is_empty());
    }

    #[test]
    fn test_entries_include_entities_and_fields() {
        let meta = KeyspaceMetadata {
            tables: vec!["users".into()],
            user_types: vec![UserType {
                name: "address".into(),
                fields: vec!["street".into(), "city".into()],
            }],
            ..KeyspaceMetadata::default()
        };
        let paths: Vec<String> = entries(&meta)
            .into_iter()
            .map(|e| {
                let mut segs = e.parents;
                segs.push(e.label);
                segs.join("/")
            })
            .collect();
        assert_eq!(
            paths,
            vec![
                "Tables",
                "Tables/users",
                "UserTypes",
                "UserTypes/address",
                "UserTypes/address/street",
                "UserTypes/address/city",
            ]
        );
    }
}
