use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating mode of a line controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "WORK")]
    Work,
    #[default]
    #[serde(rename = "BREAK")]
    Break,
}

impl Mode {
    /// Parse the wire value. Matching is case-sensitive, like the firmware sends it.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "WORK" => Some(Mode::Work),
            "BREAK" => Some(Mode::Break),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Work => "WORK",
            Mode::Break => "BREAK",
        }
    }

    pub fn is_work(&self) -> bool {
        matches!(self, Mode::Work)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
