//! Playback speed ladder.

use crate::error::SpeedError;

/// Ordered speed labels, slowest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedLadder {
    levels: Vec<String>,
}

impl SpeedLadder {
    pub fn new(levels: Vec<String>) -> Self {
        Self { levels }
    }

    /// Label `offset` steps away from `current`.
    pub fn step(&self, current: &str, offset: i64) -> Result<&str, SpeedError> {
        let (slowest, fastest) = match (self.levels.first(), self.levels.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SpeedError::NoLevels),
        };
        let index = self
            .levels
            .iter()
            .position(|level| level == current)
            .ok_or_else(|| SpeedError::UnknownLevel(current.to_string()))?;

        let target = (index as i64).saturating_add(offset);
        if target < 0 {
            return Err(SpeedError::TooLow {
                current: current.to_string(),
                offset,
                slowest: slowest.clone(),
            });
        }
        if target >= self.levels.len() as i64 {
            return Err(SpeedError::TooHigh {
                current: current.to_string(),
                offset,
                fastest: fastest.clone(),
            });
        }
        Ok(&self.levels[target as usize])
    }
}
