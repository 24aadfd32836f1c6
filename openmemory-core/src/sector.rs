use serde::{Deserialize, Serialize};
use std::fmt;

/// The five cognitive memory sectors a piece of text can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Semantic,
    Episodic,
    Procedural,
    Emotional,
    Reflective,
}

impl Sector {
    /// All five sectors, in a fixed, deterministic order.
    pub const ALL: [Sector; 5] = [
        Sector::Semantic,
        Sector::Episodic,
        Sector::Procedural,
        Sector::Emotional,
        Sector::Reflective,
    ];

    pub const COUNT: usize = 5;

    /// Default per-sector decay rate (`decay_lambda`), per spec.md §3.
    pub fn default_decay_lambda(self) -> f64 {
        match self {
            Sector::Semantic => 0.03,
            Sector::Episodic => 0.08,
            Sector::Procedural => 0.02,
            Sector::Emotional => 0.05,
            Sector::Reflective => 0.04,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sector::Semantic => "semantic",
            Sector::Episodic => "episodic",
            Sector::Procedural => "procedural",
            Sector::Emotional => "emotional",
            Sector::Reflective => "reflective",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Sector> {
        match s {
            "semantic" => Some(Sector::Semantic),
            "episodic" => Some(Sector::Episodic),
            "procedural" => Some(Sector::Procedural),
            "emotional" => Some(Sector::Emotional),
            "reflective" => Some(Sector::Reflective),
            _ => None,
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str_name() {
        for sector in Sector::ALL {
            assert_eq!(Sector::from_str_name(sector.as_str()), Some(sector));
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(Sector::from_str_name("bogus"), None);
    }

    #[test]
    fn decay_lambdas_match_spec_defaults() {
        assert_eq!(Sector::Semantic.default_decay_lambda(), 0.03);
        assert_eq!(Sector::Episodic.default_decay_lambda(), 0.08);
        assert_eq!(Sector::Procedural.default_decay_lambda(), 0.02);
        assert_eq!(Sector::Emotional.default_decay_lambda(), 0.05);
        assert_eq!(Sector::Reflective.default_decay_lambda(), 0.04);
    }
}
