use std::fmt;

use serde::{Deserialize, Serialize};

/// Show category name as keyed in the reference tables (`Concert`, `Standup`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowCategory(pub String);

impl ShowCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShowCategory {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
