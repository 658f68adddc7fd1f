use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::DomainError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn letter(self) -> char {
        match self {
            Hand::Left => 'L',
            Hand::Right => 'R',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'L' | 'l' => Some(Hand::Left),
            'R' | 'r' => Some(Hand::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// `grace` only changes display; matching compares `hand` alone.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stroke {
    pub hand: Hand,
    #[serde(default)]
    pub grace: bool,
}

impl Stroke {
    pub fn new(hand: Hand) -> Self {
        Self { hand, grace: false }
    }

    pub fn grace(hand: Hand) -> Self {
        Self { hand, grace: true }
    }

    pub fn matches(&self, hand: Hand) -> bool {
        self.hand == hand
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.grace {
            write!(f, "{}", self.hand.letter().to_ascii_lowercase())?;
        }
        write!(f, "{}", self.hand.letter())
    }
}

impl FromStr for Stroke {
    type Err = DomainError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = token.chars().collect();
        let invalid = || DomainError::validation(format!("invalid sticking token {token:?}"));
        match chars.as_slice() {
            [main] if main.is_ascii_uppercase() => {
                Hand::from_letter(*main).map(Stroke::new).ok_or_else(invalid)
            }
            [grace, main] if grace.is_ascii_lowercase() && main.is_ascii_uppercase() => {
                let hand = Hand::from_letter(*main).ok_or_else(invalid)?;
                if Hand::from_letter(*grace) != Some(hand) {
                    return Err(invalid());
                }
                Ok(Stroke::grace(hand))
            }
            _ => Err(invalid()),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct StrokeEvent {
    pub hand: Hand,
    pub timestamp: Duration,
    pub velocity: Option<f32>,
    /// Normalized distance of the hit from the pad center, if known.
    pub position: Option<f32>,
}

impl StrokeEvent {
    pub fn new(hand: Hand, timestamp: Duration) -> Self {
        Self {
            hand,
            timestamp,
            velocity: None,
            position: None,
        }
    }

    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_position(mut self, distance: f32) -> Self {
        self.position = Some(distance);
        self
    }
}
