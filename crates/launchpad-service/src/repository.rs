//! Seat repository traits.
//!
//! Defines the interface to seat persistence. Reads that only feed the
//! cache go through [`SeatRepository`] directly; every read-modify-write
//! runs inside a [`SeatTransaction`] so that it applies entirely or not at
//! all.

use async_trait::async_trait;
use launchpad_core::{Seat, SeatId, SeatStatus};

/// Errors returned by the seat repository.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    RecordNotFound,

    #[error("database error: {message}")]
    Database { message: String },

    #[error("transaction error: {message}")]
    Transaction { message: String },
}

impl RepositoryError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Seat persistence.
#[async_trait]
pub trait SeatRepository: Send + Sync {
    /// Seats that are in service (status other than `None`), ordered by id.
    ///
    /// Takes no locks.
    async fn get_active_seats(&self) -> RepositoryResult<Vec<Seat>>;

    /// Begins a new transaction.
    ///
    /// The transaction must be either committed or rolled back. Dropping it
    /// without either must behave as a rollback.
    async fn begin_transaction(&self) -> RepositoryResult<Box<dyn SeatTransaction>>;
}

/// A unit of seat changes that is applied atomically.
///
/// Writes made through the transaction are invisible to other readers until
/// [`commit`](SeatTransaction::commit) succeeds.
#[async_trait]
pub trait SeatTransaction: Send + Sync {
    /// Every seat ever created, ordered by id.
    async fn get_seats(&mut self) -> RepositoryResult<Vec<Seat>>;

    /// Read one seat and hold a record lock on it until the transaction
    /// ends.
    async fn get_seat_for_update(&mut self, seat_id: SeatId) -> RepositoryResult<Seat>;

    async fn create_seats(&mut self, seats: &[Seat]) -> RepositoryResult<()>;

    async fn update_seats_status(
        &mut self,
        seat_ids: &[SeatId],
        status: SeatStatus,
    ) -> RepositoryResult<()>;

    /// Commits all changes made in this transaction.
    async fn commit(self: Box<Self>) -> RepositoryResult<()>;

    /// Discards all changes made in this transaction.
    async fn rollback(self: Box<Self>) -> RepositoryResult<()>;
}
