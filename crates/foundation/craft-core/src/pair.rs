//! Input pairs and how they are matched against stored records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether `[a, b]` and `[b, a]` name the same combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairOrder {
    /// Only the exact `[first, second]` order matches.
    Ordered,
    /// Either order matches.
    #[default]
    Unordered,
}

impl PairOrder {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ordered" | "strict" => Some(Self::Ordered),
            "unordered" | "any" => Some(Self::Unordered),
            _ => None,
        }
    }
}

impl fmt::Display for PairOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordered => write!(f, "ordered"),
            Self::Unordered => write!(f, "unordered"),
        }
    }
}

/// Two element names in the order the player supplied them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementPair {
    first: String,
    second: String,
}

impl ElementPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    /// Whether stored parents `[a, b]` satisfy this pair under `order`.
    pub fn matches(&self, parents: &[String; 2], order: PairOrder) -> bool {
        let exact = parents[0] == self.first && parents[1] == self.second;
        match order {
            PairOrder::Ordered => exact,
            PairOrder::Unordered => {
                exact || (parents[0] == self.second && parents[1] == self.first)
            }
        }
    }

    /// Key shared by every pair that `order` treats as equivalent.
    pub fn key(&self, order: PairOrder) -> (String, String) {
        match order {
            PairOrder::Unordered if self.second < self.first => {
                (self.second.clone(), self.first.clone())
            }
            _ => (self.first.clone(), self.second.clone()),
        }
    }
}

impl fmt::Display for ElementPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents(a: &str, b: &str) -> [String; 2] {
        [a.to_string(), b.to_string()]
    }

    #[test]
    fn test_ordered_match() {
        let pair = ElementPair::new("Fire", "Water");
        assert!(pair.matches(&parents("Fire", "Water"), PairOrder::Ordered));
        assert!(!pair.matches(&parents("Water", "Fire"), PairOrder::Ordered));
    }

    #[test]
    fn test_unordered_match() {
        let pair = ElementPair::new("Fire", "Water");
        assert!(pair.matches(&parents("Water", "Fire"), PairOrder::Unordered));
        assert!(!pair.matches(&parents("Fire", "Earth"), PairOrder::Unordered));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let pair = ElementPair::new("fire", "Water");
        assert!(!pair.matches(&parents("Fire", "Water"), PairOrder::Unordered));
    }

    #[test]
    fn test_key_normalizes_unordered() {
        let a = ElementPair::new("Water", "Fire");
        let b = ElementPair::new("Fire", "Water");
        assert_eq!(a.key(PairOrder::Unordered), b.key(PairOrder::Unordered));
        assert_ne!(a.key(PairOrder::Ordered), b.key(PairOrder::Ordered));
    }

    #[test]
    fn test_pair_order_from_str() {
        assert_eq!(PairOrder::from_str("Ordered"), Some(PairOrder::Ordered));
        assert_eq!(PairOrder::from_str("any"), Some(PairOrder::Unordered));
        assert_eq!(PairOrder::from_str("sideways"), None);
    }
}
