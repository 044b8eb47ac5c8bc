//! Ordered levels played one after another.

use gate_runner_core::CellCoord;
use thiserror::Error;

use crate::map::{self, GameMap, LoadedMap, MapError};

/// Named, validated level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    name: String,
    layout: LoadedMap,
}

impl Level {
    /// Parses and validates `source` as a level called `name`.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, MapError> {
        Ok(Self {
            name: name.into(),
            layout: map::load(source)?,
        })
    }

    /// Human readable level name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pristine tile map of the level.
    #[must_use]
    pub fn map(&self) -> &GameMap {
        &self.layout.map
    }

    /// Cell where the player begins.
    #[must_use]
    pub fn player_start(&self) -> CellCoord {
        self.layout.player_start
    }

    /// Cell holding the exit.
    #[must_use]
    pub fn exit(&self) -> CellCoord {
        self.layout.exit
    }
}

/// Failures when assembling a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CampaignError {
    /// No level was supplied.
    #[error("a campaign needs at least one level")]
    Empty,
}

/// Non-empty ordered list of levels.
#[derive(Clone, Debug)]
pub struct Campaign {
    levels: Vec<Level>,
}

impl Campaign {
    /// Creates a campaign from `levels`, played in order.
    pub fn new(levels: Vec<Level>) -> Result<Self, CampaignError> {
        if levels.is_empty() {
            return Err(CampaignError::Empty);
        }
        Ok(Self { levels })
    }

    /// Campaign made of a single level.
    #[must_use]
    pub fn single(level: Level) -> Self {
        Self {
            levels: vec![level],
        }
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Level at `index`.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Every level in play order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_campaigns_are_rejected() {
        assert_eq!(Campaign::new(Vec::new()).err(), Some(CampaignError::Empty));
    }

    #[test]
    fn levels_keep_their_order() {
        let first = Level::parse("first", "1111\n1PC1\n11E1").expect("valid level");
        let second = Level::parse("second", "1111\n1CP1\n1E11").expect("valid level");
        let campaign = Campaign::new(vec![first, second]).expect("non-empty");
        assert_eq!(campaign.len(), 2);
        assert_eq!(campaign.level(1).map(Level::name), Some("second"));
        assert_eq!(campaign.level(0).map(Level::exit), Some(CellCoord::new(2, 2)));
    }
}
