use crate::utils::error::{Result, WcsError};
use indexmap::IndexMap;
use serde::Serialize;

/// Insertion-ordered map from coverage identifier to metadata.
///
/// Re-inserting an existing identifier replaces the value but keeps its
/// original position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Contents<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Contents<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Contents<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: String, value: T) -> Option<T> {
        self.entries.insert(identifier, value)
    }

    pub fn get(&self, identifier: &str) -> Option<&T> {
        self.entries.get(identifier)
    }

    /// Like [`Contents::get`] but unknown identifiers are an error.
    pub fn lookup(&self, identifier: &str) -> Result<&T> {
        self.get(identifier)
            .ok_or_else(|| WcsError::CoverageNotFound {
                identifier: identifier.to_string(),
            })
    }

    pub fn contains_key(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(id, value)| (id.as_str(), value))
    }
}

impl<'a, T> IntoIterator for &'a Contents<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = indexmap::map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut contents = Contents::new();
        contents.insert("b".to_string(), 1);
        contents.insert("a".to_string(), 2);
        contents.insert("c".to_string(), 3);

        let keys: Vec<&str> = contents.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut contents = Contents::new();
        contents.insert("x".to_string(), 1);
        contents.insert("y".to_string(), 2);
        assert_eq!(contents.insert("x".to_string(), 10), Some(1));

        let pairs: Vec<(&str, &i32)> = contents.iter().collect();
        assert_eq!(pairs, vec![("x", &10), ("y", &2)]);
        assert_eq!(contents.len(), 2);
    }

    #[test]
    fn test_lookup_unknown_identifier() {
        let contents: Contents<i32> = Contents::new();
        match contents.lookup("missing") {
            Err(WcsError::CoverageNotFound { identifier }) => assert_eq!(identifier, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let mut contents = Contents::new();
        contents.insert("z".to_string(), 1);
        contents.insert("a".to_string(), 2);
        let json = serde_json::to_string(&contents).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_many_entries_keep_order_and_resolve() {
        let mut contents = Contents::new();
        for i in 0..20_000 {
            contents.insert(format!("cov{}", i), i);
        }

        assert_eq!(contents.len(), 20_000);
        assert_eq!(contents.keys().next(), Some("cov0"));
        assert_eq!(contents.keys().last(), Some("cov19999"));
        for i in (0..20_000).step_by(997) {
            assert_eq!(contents.lookup(&format!("cov{}", i)).unwrap(), &i);
        }
        assert!(contents.contains_key("cov12345"));
        assert!(!contents.contains_key("cov20000"));
    }
}
