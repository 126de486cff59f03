//! Seats of the launcher kiosk.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Seat number, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatId(u32);

impl SeatId {
    pub fn new(id: u32) -> Result<Self> {
        if id == 0 {
            return Err(CoreError::InvalidSeatId(id));
        }
        Ok(Self(id))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Ids `1..=count` in ascending order.
    pub fn first(count: u32) -> impl Iterator<Item = SeatId> {
        (1..=count).map(SeatId)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Occupancy state of a seat. `None` marks a seat that is not in service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    None,
    Empty,
    InUse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    id: SeatId,
    status: SeatStatus,
}

impl Seat {
    pub fn new(id: SeatId, status: SeatStatus) -> Self {
        Self { id, status }
    }

    pub fn id(&self) -> SeatId {
        self.id
    }

    pub fn status(&self) -> SeatStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SeatStatus) {
        self.status = status;
    }

    /// Whether the seat is in service (empty or occupied).
    pub fn is_active(&self) -> bool {
        self.status != SeatStatus::None
    }
}
