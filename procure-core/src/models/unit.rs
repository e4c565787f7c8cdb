use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit an item is bought in. Persisted with the labels used on the shop
/// floor (`件` / `包`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "件", alias = "piece")]
    Piece,
    #[serde(rename = "包", alias = "pack")]
    Pack,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Piece => "件",
            Unit::Pack => "包",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "piece" | "件" => Ok(Unit::Piece),
            "pack" | "包" => Ok(Unit::Pack),
            _ => Err(format!(
                "Invalid unit '{}'. Valid options: piece (件), pack (包)",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_from_str() {
        assert_eq!(Unit::from_str("piece").unwrap(), Unit::Piece);
        assert_eq!(Unit::from_str("PACK").unwrap(), Unit::Pack);
        assert_eq!(Unit::from_str("件").unwrap(), Unit::Piece);
        assert_eq!(Unit::from_str("包").unwrap(), Unit::Pack);
        assert!(Unit::from_str("box").is_err());
    }

    #[test]
    fn test_unit_json() {
        assert_eq!(serde_json::to_string(&Unit::Pack).unwrap(), "\"包\"");
        assert_eq!(serde_json::from_str::<Unit>("\"件\"").unwrap(), Unit::Piece);
        assert_eq!(serde_json::from_str::<Unit>("\"pack\"").unwrap(), Unit::Pack);
    }
}
