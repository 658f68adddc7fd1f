use serde::{Deserialize, Serialize};

use crate::{events::Stroke, tempo::TempoThresholds, DomainError, Hand};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rudiment {
    pub id: u32,
    pub name: String,
    sequence: Vec<Stroke>,
    pub thresholds: TempoThresholds,
}

impl Rudiment {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        sequence: Vec<Stroke>,
        thresholds: TempoThresholds,
    ) -> Result<Self, DomainError> {
        if id == 0 {
            return Err(DomainError::validation("rudiment ids start at 1"));
        }
        if sequence.is_empty() {
            return Err(DomainError::validation("rudiment needs at least one stroke"));
        }
        Ok(Self {
            id,
            name: name.into(),
            sequence,
            thresholds,
        })
    }

    pub fn from_sticking(
        id: u32,
        name: impl Into<String>,
        sticking: &str,
        thresholds: TempoThresholds,
    ) -> Result<Self, DomainError> {
        let sequence = sticking
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Stroke>, _>>()?;
        Self::new(id, name, sequence, thresholds)
    }

    pub fn sequence(&self) -> &[Stroke] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn expected(&self, index: usize) -> Option<Hand> {
        self.sequence.get(index).map(|stroke| stroke.hand)
    }

    /// Sticking grouped in fours, e.g. `"R L R R  L R L L"`.
    pub fn sticking(&self) -> String {
        self.sequence
            .chunks(4)
            .map(|group| {
                group
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}
