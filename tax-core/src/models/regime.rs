use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Old,
    New,
}

impl Regime {
    /// First fiscal year (start year) in which the new regime can be elected.
    pub const NEW_REGIME_INTRODUCED: i32 = 2020;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Some(Self::Old),
            "new" => Some(Self::New),
            _ => None,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Old => Self::New,
            Self::New => Self::Old,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_mixed_case() {
        assert_eq!(Regime::parse("New"), Some(Regime::New));
        assert_eq!(Regime::parse(" old "), Some(Regime::Old));
        assert_eq!(Regime::parse("middle"), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for regime in [Regime::Old, Regime::New] {
            assert_eq!(Regime::parse(regime.as_str()), Some(regime));
        }
    }

    #[test]
    fn other_flips_regime() {
        assert_eq!(Regime::Old.other(), Regime::New);
        assert_eq!(Regime::New.other(), Regime::Old);
    }
}
