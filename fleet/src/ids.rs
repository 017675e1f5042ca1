use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleID(#[serde(deserialize_with = "string_or_number")] String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteID(#[serde(deserialize_with = "string_or_number")] String);

impl VehicleID {
    pub fn new<I: Into<String>>(id: I) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RouteID {
    pub fn new<I: Into<String>>(id: I) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RouteID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Route colors double as filter keys. The color is drawn exactly as given, but `#EF4444` and
/// ` #ef4444` are the same key.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RouteColor {
    raw: String,
    key: String,
}

impl RouteColor {
    pub fn new(color: &str) -> Self {
        Self {
            raw: color.to_string(),
            key: color.trim().to_ascii_lowercase(),
        }
    }

    /// As it appeared in the source data
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for RouteColor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for RouteColor {}

impl PartialOrd for RouteColor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RouteColor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for RouteColor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl From<String> for RouteColor {
    fn from(color: String) -> Self {
        Self::new(&color)
    }
}

impl From<RouteColor> for String {
    fn from(color: RouteColor) -> Self {
        color.raw
    }
}

impl fmt::Display for RouteColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// The source data isn't consistent about quoting IDs
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Text(x) => x,
        Raw::Int(x) => x.to_string(),
        Raw::Float(x) => x.to_string(),
    })
}
