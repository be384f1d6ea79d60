use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "REMOVE / PAUSE")]
    RemoveOrPause,
    #[serde(rename = "INCREASE PRICE")]
    IncreasePrice,
    #[serde(rename = "DECREASE PRICE")]
    DecreasePrice,
    #[serde(rename = "KEEP")]
    Keep,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Self::RemoveOrPause => "REMOVE / PAUSE",
            Self::IncreasePrice => "INCREASE PRICE",
            Self::DecreasePrice => "DECREASE PRICE",
            Self::Keep => "KEEP",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub reason: String,
}
