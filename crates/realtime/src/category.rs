//! # Category
//!
//! Transit categories partition both the real-time feed and the static GTFS
//! dataset. Each category has its own feed query, its own static directory,
//! and its own slice of the durable vehicle set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

const MRT_FEEDER: &str = "rapid-bus-mrtfeeder";
const KL: &str = "rapid-bus-kl";

/// A transit category such as `rapid-bus-mrtfeeder`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// The MRT feeder bus network.
    #[must_use]
    pub fn mrt_feeder() -> Self {
        Self(MRT_FEEDER.to_string())
    }

    /// The Klang Valley bus network.
    #[must_use]
    pub fn kl() -> Self {
        Self(KL.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory holding the category's unpacked static tables.
    #[must_use]
    pub fn dir_name(&self) -> String {
        self.0.replace('-', "_")
    }

    /// Category to borrow static tables from when this category lacks them.
    #[must_use]
    pub fn fallback(&self) -> Option<Self> {
        (self.0 == KL).then(Self::mrt_feeder)
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();

        // short aliases
        let s = match lowered.as_str() {
            "mrtfeeder" => MRT_FEEDER,
            "kl" => KL,
            other => other,
        };

        if s.is_empty() {
            return Err(Error::BadRequest("category is empty".to_string()));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(Error::BadRequest(format!("invalid category: {s}")));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Category;

    #[test]
    fn aliases() {
        assert_eq!("kl".parse::<Category>().expect("should parse"), Category::kl());
        assert_eq!("mrtfeeder".parse::<Category>().expect("should parse"), Category::mrt_feeder());
    }

    #[test]
    fn aliases_ignore_case() {
        let category = " KL ".parse::<Category>().expect("should parse");
        assert_eq!(category, Category::kl());
        assert_eq!(category.dir_name(), "rapid_bus_kl");
        let category = "Rapid-Bus-MRTFeeder".parse::<Category>().expect("should parse");
        assert_eq!(category, Category::mrt_feeder());
    }

    #[test]
    fn dir_name() {
        assert_eq!(Category::mrt_feeder().dir_name(), "rapid_bus_mrtfeeder");
        assert_eq!(Category::kl().dir_name(), "rapid_bus_kl");
    }

    #[test]
    fn fallback() {
        assert_eq!(Category::kl().fallback(), Some(Category::mrt_feeder()));
        assert_eq!(Category::mrt_feeder().fallback(), None);
    }

    #[test]
    fn rejects_paths() {
        assert!("../etc".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }
}
