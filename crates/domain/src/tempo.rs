use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Achievement grade. Variant order is rank order.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    pub fn is_earned(self) -> bool {
        self != Tier::None
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::None => "none",
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawThresholds")]
pub struct TempoThresholds {
    bronze: u32,
    silver: u32,
    gold: u32,
}

#[derive(Deserialize)]
struct RawThresholds {
    bronze: u32,
    silver: u32,
    gold: u32,
}

impl TryFrom<RawThresholds> for TempoThresholds {
    type Error = DomainError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Self::new(raw.bronze, raw.silver, raw.gold)
    }
}

impl TempoThresholds {
    pub fn new(bronze: u32, silver: u32, gold: u32) -> Result<Self, DomainError> {
        if bronze == 0 {
            return Err(DomainError::validation("bronze threshold must be positive"));
        }
        if !(bronze < silver && silver < gold) {
            return Err(DomainError::validation(format!(
                "thresholds must be strictly increasing, got {bronze}/{silver}/{gold}"
            )));
        }
        Ok(Self {
            bronze,
            silver,
            gold,
        })
    }

    pub fn bronze(&self) -> u32 {
        self.bronze
    }

    pub fn silver(&self) -> u32 {
        self.silver
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::None < Tier::Bronze);
        assert!(Tier::Bronze < Tier::Silver);
        assert!(Tier::Silver < Tier::Gold);
        assert_eq!(Tier::default(), Tier::None);
        assert!(!Tier::None.is_earned());
    }

    #[test]
    fn threshold_validation() {
        assert!(TempoThresholds::new(0, 10, 20).is_err());
        assert!(TempoThresholds::new(60, 60, 160).is_err());
        assert!(TempoThresholds::new(60, 170, 160).is_err());
        let thresholds = TempoThresholds::new(60, 120, 160).unwrap();
        assert_eq!(thresholds.silver(), 120);
    }

    #[test]
    fn thresholds_deserialize_with_validation() {
        let ok: TempoThresholds =
            serde_json::from_str(r#"{"bronze":60,"silver":120,"gold":160}"#).unwrap();
        assert_eq!(ok.gold(), 160);
        let bad = serde_json::from_str::<TempoThresholds>(r#"{"bronze":90,"silver":80,"gold":160}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Silver).unwrap(), "\"silver\"");
    }
}
