//! Ordered key/value properties carried by subjects (side, flag, colors)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::Rgb;

pub const SELECTION_COLOR_RGB: &str = "SELECTION_COLOR_RGB";
pub const FLAG: &str = "FLAG";
pub const SIDE: &str = "SIDE";

pub const FLAG_DE: &str = "FLAG_DE";
pub const FLAG_USSR: &str = "FLAG_USSR";

pub const DE_COLOR: Rgb = Rgb(0, 81, 211);
pub const USSR_COLOR: Rgb = Rgb(204, 0, 0);

/// Keys whose values are persisted as `"r,g,b"`
const COLOR_KEYS: &[&str] = &[SELECTION_COLOR_RGB];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Text(String),
    Color(Rgb),
}

impl PropertyValue {
    /// Parse a persisted token, typed by its key
    pub fn from_token(key: &str, token: &str) -> Result<Self, String> {
        if COLOR_KEYS.contains(&key) {
            Ok(PropertyValue::Color(token.parse()?))
        } else {
            Ok(PropertyValue::Text(token.to_string()))
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Color(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Color(c) => c.fmt(f),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<Rgb> for PropertyValue {
    fn from(c: Rgb) -> Self {
        PropertyValue::Color(c)
    }
}

/// Insertion-ordered property list; setting an existing key keeps its slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    items: Vec<(String, PropertyValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        let value = value.into();
        match self.items.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.items.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (k, v) in iter {
            properties.set(k, v);
        }
        properties
    }
}

/// Opposing camps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Axis,
    Allies,
}

impl Side {
    /// Accepts both `AXIS` and `SIDE_AXIS` spellings
    pub fn from_token(token: &str) -> Option<Self> {
        match token.strip_prefix("SIDE_").unwrap_or(token) {
            "AXIS" => Some(Side::Axis),
            "ALLIES" => Some(Side::Allies),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Side::Axis => "AXIS",
            Side::Allies => "ALLIES",
        }
    }
}
