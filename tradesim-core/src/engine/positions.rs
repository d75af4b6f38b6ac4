//! Open positions keyed by instrument.
//!
//! Owned by one engine run. Holds at most one position per instrument.

use std::collections::BTreeMap;

use crate::domain::Position;

#[derive(Debug, Clone, Default)]
pub struct PositionTable {
    positions: BTreeMap<String, Position>,
}

impl PositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, instrument: &str) -> Option<&Position> {
        self.positions.get(instrument)
    }

    pub fn get_mut(&mut self, instrument: &str) -> Option<&mut Position> {
        self.positions.get_mut(instrument)
    }

    pub fn is_open(&self, instrument: &str) -> bool {
        self.positions.contains_key(instrument)
    }

    /// Insert a position. Refused (returns the position back) when the
    /// instrument already has one.
    pub fn open(&mut self, instrument: &str, position: Position) -> Result<(), Position> {
        if self.is_open(instrument) {
            return Err(position);
        }
        self.positions.insert(instrument.to_string(), position);
        Ok(())
    }

    pub fn close(&mut self, instrument: &str) -> Option<Position> {
        self.positions.remove(instrument)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), v))
    }
}
