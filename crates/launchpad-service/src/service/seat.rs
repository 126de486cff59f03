//! Launcher seat management with caching of the active seats.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use launchpad_core::{Seat, SeatId, SeatStatus};

use super::{fill_result, from_cache};
use crate::cache::SeatCache;
use crate::context::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::{self, SeatTraffic};
use crate::repository::{RepositoryError, SeatRepository, SeatTransaction};

#[derive(Clone)]
pub struct SeatService {
    repository: Arc<dyn SeatRepository>,
    cache: Arc<dyn SeatCache>,
    upstream_timeout: Option<Duration>,
}

/// Outcome of resizing the seat set inside one transaction.
struct SeatResize {
    active: Vec<Seat>,
    created: usize,
    activated: usize,
    deactivated: usize,
}

impl SeatService {
    pub fn new(repository: Arc<dyn SeatRepository>, cache: Arc<dyn SeatCache>) -> Self {
        Self {
            repository,
            cache,
            upstream_timeout: None,
        }
    }

    /// Bound repository calls whose request context carries no timeout.
    pub fn with_upstream_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Get the seats currently in service.
    pub async fn get_seats(&self, ctx: &RequestContext) -> ServiceResult<Arc<[Seat]>> {
        if let Some(seats) = from_cache(self.cache.get_active_seats().await) {
            return Ok(seats);
        }

        let ctx = ctx.or_timeout(self.upstream_timeout);
        let seats: Arc<[Seat]> = ctx.run(self.repository.get_active_seats()).await?.into();

        fill_result(self.cache.set_active_seats(Arc::clone(&seats)).await);

        Ok(seats)
    }

    /// Mark a seat as empty or in use.
    ///
    /// The seat is read under a record lock and written in the same
    /// transaction. The cached seat list is left alone and catches up when
    /// it expires.
    pub async fn update_seat_status(
        &self,
        ctx: &RequestContext,
        seat_id: SeatId,
        status: SeatStatus,
    ) -> ServiceResult<Seat> {
        if status == SeatStatus::None {
            return Err(ServiceError::InvalidSeatStatus);
        }

        let ctx = ctx.or_timeout(self.upstream_timeout);
        let mut tx = ctx.run(self.repository.begin_transaction()).await?;
        let result = ctx.run(change_status(tx.as_mut(), seat_id, status)).await;
        let (seat, previous) = finish(tx, result).await?;

        // Counted only once the change is committed.
        match (previous, status) {
            (SeatStatus::InUse, SeatStatus::Empty) => metrics::record_seat_traffic(SeatTraffic::Out),
            (SeatStatus::Empty, SeatStatus::InUse) => metrics::record_seat_traffic(SeatTraffic::In),
            _ => {}
        }
        if previous != status {
            tracing::debug!(%seat_id, from = ?previous, to = ?status, "seat status changed");
        }

        Ok(seat)
    }

    /// Put exactly seats `1..=num` in service.
    ///
    /// Missing seats are created empty, seats out of service are brought
    /// back as empty and seats above `num` are taken out of service, all in
    /// one transaction. Once committed, the new active set is offered to the
    /// cache.
    pub async fn update_seat_num(
        &self,
        ctx: &RequestContext,
        num: u32,
    ) -> ServiceResult<Arc<[Seat]>> {
        let ctx = ctx.or_timeout(self.upstream_timeout);
        let mut tx = ctx.run(self.repository.begin_transaction()).await?;
        let result = ctx.run(resize(tx.as_mut(), num)).await;
        let resized = finish(tx, result).await?;

        tracing::info!(
            num,
            created = resized.created,
            activated = resized.activated,
            deactivated = resized.deactivated,
            "seat count updated"
        );

        let active: Arc<[Seat]> = resized.active.into();
        fill_result(self.cache.set_active_seats(Arc::clone(&active)).await);

        Ok(active)
    }
}

/// Commit on success, roll back on failure.
async fn finish<T>(tx: Box<dyn SeatTransaction>, result: ServiceResult<T>) -> ServiceResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "failed to roll back seat transaction");
            }
            Err(err)
        }
    }
}

/// Returns the seat after the change and its status before it.
async fn change_status<T>(
    tx: &mut T,
    seat_id: SeatId,
    status: SeatStatus,
) -> ServiceResult<(Seat, SeatStatus)>
where
    T: SeatTransaction + ?Sized,
{
    let mut seat = match tx.get_seat_for_update(seat_id).await {
        Err(RepositoryError::RecordNotFound) => return Err(ServiceError::NoSeat),
        result => result?,
    };
    let previous = seat.status();
    if !seat.is_active() {
        return Err(ServiceError::NoSeat);
    }
    if previous == status {
        return Ok((seat, previous));
    }

    seat.set_status(status);
    tx.update_seats_status(&[seat_id], status).await?;

    Ok((seat, previous))
}

async fn resize<T>(tx: &mut T, num: u32) -> ServiceResult<SeatResize>
where
    T: SeatTransaction + ?Sized,
{
    let seats = tx.get_seats().await?;
    let mut by_id: HashMap<SeatId, Seat> =
        seats.into_iter().map(|seat| (seat.id(), seat)).collect();

    let mut active = Vec::with_capacity(num as usize);
    let mut new_seats = Vec::new();
    let mut activate_ids = Vec::new();
    for seat_id in SeatId::first(num) {
        let seat = match by_id.remove(&seat_id) {
            Some(mut seat) => {
                if !seat.is_active() {
                    activate_ids.push(seat_id);
                    seat.set_status(SeatStatus::Empty);
                }
                seat
            }
            None => {
                let seat = Seat::new(seat_id, SeatStatus::Empty);
                new_seats.push(seat.clone());
                seat
            }
        };
        active.push(seat);
    }

    // Whatever is left lies above `num`.
    let mut deactivate_ids: Vec<SeatId> = by_id
        .into_values()
        .filter(Seat::is_active)
        .map(|seat| seat.id())
        .collect();
    deactivate_ids.sort_unstable();

    if !new_seats.is_empty() {
        tx.create_seats(&new_seats).await?;
    }
    if !deactivate_ids.is_empty() {
        tx.update_seats_status(&deactivate_ids, SeatStatus::None)
            .await?;
    }
    if !activate_ids.is_empty() {
        tx.update_seats_status(&activate_ids, SeatStatus::Empty)
            .await?;
    }

    Ok(SeatResize {
        active,
        created: new_seats.len(),
        activated: activate_ids.len(),
        deactivated: deactivate_ids.len(),
    })
}
