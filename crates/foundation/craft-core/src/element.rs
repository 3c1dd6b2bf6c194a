//! Elements and the records that link them to their parents.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ElementPair, Error, Result};

/// A named, emoji-tagged game entity. Identity is the exact `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub emoji: String,
}

impl Element {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }

    /// Build an element, rejecting blank names or emoji.
    pub fn checked(name: &str, emoji: &str) -> Result<Self> {
        let name = name.trim();
        let emoji = emoji.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if emoji.is_empty() {
            return Err(Error::EmptyEmoji(name.to_string()));
        }
        Ok(Self::new(name, emoji))
    }

    /// Parse the JSON array stored under the client `elements` key.
    pub fn list_from_json(raw: &str) -> Result<Vec<Element>> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn list_to_json(elements: &[Element]) -> Result<String> {
        Ok(serde_json::to_string(elements)?)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}

/// The starter set every fresh game begins with, in sidebar order.
pub fn initial_elements() -> Vec<Element> {
    vec![
        Element::new("Water", "💧"),
        Element::new("Fire", "🔥"),
        Element::new("Wind", "🌬️"),
        Element::new("Earth", "🌍"),
    ]
}

/// Persisted result of one combination event.
///
/// Several records may share the same parents; nothing enforces a single
/// canonical result per pair at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationRecord {
    pub name: String,
    pub emoji: String,
    pub parent_elements: [String; 2],
}

impl CombinationRecord {
    pub fn new(element: Element, pair: &ElementPair) -> Self {
        Self {
            name: element.name,
            emoji: element.emoji,
            parent_elements: [pair.first().to_string(), pair.second().to_string()],
        }
    }

    pub fn element(&self) -> Element {
        Element::new(self.name.clone(), self.emoji.clone())
    }

    pub fn parents(&self) -> ElementPair {
        let [first, second] = &self.parent_elements;
        ElementPair::new(first.clone(), second.clone())
    }
}

/// Body of a successful `GET /api/combine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineResponse {
    pub name: String,
    pub emoji: String,
    pub new: bool,
}

impl CombineResponse {
    pub fn new(element: Element, new: bool) -> Self {
        Self {
            name: element.name,
            emoji: element.emoji,
            new,
        }
    }

    pub fn element(&self) -> Element {
        Element::new(self.name.clone(), self.emoji.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_parent_elements_field() {
        let pair = ElementPair::new("Fire", "Water");
        let record = CombinationRecord::new(Element::new("Steam", "💨"), &pair);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "Steam");
        assert_eq!(json["emoji"], "💨");
        assert_eq!(json["parentElements"], serde_json::json!(["Fire", "Water"]));
    }

    #[test]
    fn test_record_ignores_foreign_fields() {
        let raw = r#"{"_id":"abc","__v":0,"name":"Lava","emoji":"🌋","parentElements":["Fire","Earth"]}"#;
        let record: CombinationRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.element(), Element::new("Lava", "🌋"));
        assert_eq!(record.parents(), ElementPair::new("Fire", "Earth"));
    }

    #[test]
    fn test_checked_rejects_blank() {
        assert!(matches!(Element::checked("  ", "🔥"), Err(Error::EmptyName)));
        assert!(matches!(Element::checked("Fire", ""), Err(Error::EmptyEmoji(_))));
        assert_eq!(Element::checked(" Fire ", "🔥").unwrap().name, "Fire");
    }

    #[test]
    fn test_initial_elements() {
        let names: Vec<_> = initial_elements().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Water", "Fire", "Wind", "Earth"]);
    }

    #[test]
    fn test_element_list_json() {
        let json = Element::list_to_json(&initial_elements()).unwrap();
        assert!(json.starts_with(r#"[{"name":"Water","emoji":"💧"}"#));
        assert_eq!(Element::list_from_json(&json).unwrap(), initial_elements());
    }
}
