use serde::Deserialize;

use crate::{rudiment::Rudiment, tempo::TempoThresholds, DomainError};

/// Built-in progression: name, sticking, bronze/silver/gold BPM.
const STANDARD: &[(&str, &str, [u32; 3])] = &[
    (
        "Double Stroke Roll",
        "R R L L R R L L R R L L R R L L",
        [60, 120, 160],
    ),
    (
        "Single Paradiddle",
        "R L R R L R L L R L R R L R L L",
        [70, 130, 180],
    ),
    (
        "Five Stroke Roll",
        "R R L L R L L R R L R R L L R L",
        [80, 140, 190],
    ),
    (
        "Flam",
        "rR lL rR lL rR lL rR lL rR lL rR lL rR lL rR lL",
        [90, 150, 200],
    ),
    (
        "Double Paradiddle",
        "R L R L R R L R L R L L R L R L",
        [100, 160, 220],
    ),
    (
        "Flam Paradiddle",
        "rR L R R lL R L L rR L R R lL R L L",
        [110, 170, 240],
    ),
    (
        "Six Stroke Roll",
        "R L R R L L R L R R L L R L R R",
        [120, 180, 260],
    ),
    (
        "Flam Tap",
        "rR L lL R rR L lL R rR L lL R rR L lL R",
        [130, 200, 280],
    ),
    (
        "Ratamacue",
        "R L R L R rR L R L R lL R L R L R",
        [140, 230, 320],
    ),
    (
        "Swiss Army Triplet",
        "rR L R lL R L rR L R lL R L rR L R lL",
        [160, 260, 380],
    ),
];

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    sticking: String,
    thresholds: TempoThresholds,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RudimentCatalog {
    rudiments: Vec<Rudiment>,
}

impl RudimentCatalog {
    pub fn new(rudiments: Vec<Rudiment>) -> Result<Self, DomainError> {
        if rudiments.is_empty() {
            return Err(DomainError::validation("catalog needs at least one rudiment"));
        }
        let rudiments = rudiments
            .into_iter()
            .enumerate()
            .map(|(index, mut rudiment)| {
                rudiment.id = index as u32 + 1;
                rudiment
            })
            .collect();
        Ok(Self { rudiments })
    }

    pub fn standard() -> Self {
        let rudiments = STANDARD
            .iter()
            .enumerate()
            .map(|(index, (name, sticking, [bronze, silver, gold]))| {
                let thresholds = TempoThresholds::new(*bronze, *silver, *gold)?;
                Rudiment::from_sticking(index as u32 + 1, *name, sticking, thresholds)
            })
            .collect::<Result<Vec<_>, DomainError>>()
            .expect("standard catalog is valid");
        Self { rudiments }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, DomainError> {
        let entries: Vec<CatalogEntry> = serde_yaml::from_str(source)?;
        let rudiments = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                Rudiment::from_sticking(
                    index as u32 + 1,
                    entry.name,
                    &entry.sticking,
                    entry.thresholds,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rudiments)
    }

    pub fn get(&self, level: u32) -> Result<&Rudiment, DomainError> {
        level
            .checked_sub(1)
            .and_then(|index| self.rudiments.get(index as usize))
            .ok_or(DomainError::NotFound(level))
    }

    pub fn count(&self) -> u32 {
        self.rudiments.len() as u32
    }

    pub fn contains(&self, level: u32) -> bool {
        (1..=self.count()).contains(&level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rudiment> {
        self.rudiments.iter()
    }
}

impl Default for RudimentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
