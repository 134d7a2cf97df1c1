//! Core type definitions for tool history.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of entry in a tool's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The tool was handed out to a person.
    Checkout,
    /// The tool came back.
    Return,
    /// The tool card was edited.
    Edit,
}

impl EventKind {
    /// Human-readable label used on history lists.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checkout => "Checked out",
            Self::Return => "Returned",
            Self::Edit => "Edited",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout => write!(f, "checkout"),
            Self::Return => write!(f, "return"),
            Self::Edit => write!(f, "edit"),
        }
    }
}

impl FromStr for EventKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout" => Ok(Self::Checkout),
            "return" => Ok(Self::Return),
            "edit" => Ok(Self::Edit),
            other => Err(crate::Error::invalid_input(format!(
                "unknown event kind: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_display_matches_serde() {
        for kind in [EventKind::Checkout, EventKind::Return, EventKind::Edit] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
            assert_eq!(kind.to_string().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_event_kind_unknown() {
        assert!("borrow".parse::<EventKind>().is_err());
    }
}
