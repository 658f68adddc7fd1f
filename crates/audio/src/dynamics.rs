use serde::{Deserialize, Serialize};

const CENTER_EDGE: f32 = 0.33;
const MID_EDGE: f32 = 0.66;
const RIM_EDGE: f32 = 1.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VelocityBands {
    pub center: f32,
    pub mid: f32,
    pub edge: f32,
    pub floor: f32,
}

impl Default for VelocityBands {
    fn default() -> Self {
        Self {
            center: 1.0,
            mid: 0.7,
            edge: 0.4,
            floor: 0.2,
        }
    }
}

pub(crate) fn unit_gain(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

impl VelocityBands {
    pub fn floor_gain(&self) -> f32 {
        unit_gain(self.floor).unwrap_or(0.0)
    }

    pub fn velocity_for_distance(&self, distance: f32) -> f32 {
        let distance = distance.abs();
        let velocity = if distance <= CENTER_EDGE {
            self.center
        } else if distance <= MID_EDGE {
            self.mid
        } else if distance <= RIM_EDGE {
            self.edge
        } else {
            self.floor
        };
        unit_gain(velocity).unwrap_or_else(|| self.floor_gain())
    }

    /// An explicit velocity wins over the position hint; no hint plays at full level.
    pub fn resolve(&self, velocity: Option<f32>, distance: Option<f32>) -> f32 {
        match (velocity, distance) {
            (Some(v), _) if v.is_finite() => v.clamp(0.0, 1.0),
            (_, Some(d)) if d.is_finite() => self.velocity_for_distance(d),
            (_, Some(_)) => self.floor_gain(),
            _ => 1.0,
        }
    }
}
