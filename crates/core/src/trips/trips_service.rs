use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::trips_model::{NewTrip, Trip, TripBid, TripFilter, TripStatus};
use super::trips_registry;
use super::trips_status::can_transition;
use super::trips_traits::{TripRepositoryTrait, TripServiceTrait, TripStore};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::unit_of_work::{UnitOfWork, UnitOfWorkExt};
use crate::utils::retry::with_conflict_retry;
use crate::utils::time_utils::now_utc;

pub struct TripService {
    unit_of_work: Arc<dyn UnitOfWork>,
    repository: Arc<dyn TripRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    max_attempts: u32,
}

impl TripService {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        repository: Arc<dyn TripRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
        max_attempts: u32,
    ) -> Self {
        Self {
            unit_of_work,
            repository,
            event_sink,
            max_attempts,
        }
    }
}

#[async_trait]
impl TripServiceTrait for TripService {
    async fn create_trip(&self, input: NewTrip) -> Result<Trip> {
        input.validate()?;
        let trip = self
            .unit_of_work
            .run(move |tx| trips_registry::create_trip(tx, input, now_utc()))
            .await?;
        self.event_sink.emit(DomainEvent::trip_created(
            trip.id.clone(),
            trip.load_owner_id.clone(),
            trip.amount,
        ));
        Ok(trip)
    }

    async fn transition_status(&self, trip_id: &str, status: TripStatus) -> Result<Trip> {
        let current = self.repository.get_trip(trip_id)?;
        if !can_transition(current.status, status) {
            return Err(Error::invalid_transition(current.status, status));
        }
        if matches!(
            status,
            TripStatus::Escrowed | TripStatus::Funded | TripStatus::Repaid | TripStatus::Cancelled
        ) {
            return Err(Error::Validation(ValidationError::invalid(format!(
                "status '{}' is set by the lifecycle operations, not directly",
                status
            ))));
        }

        debug!("Moving trip {} to {}", trip_id, status);
        let (from, trip) = with_conflict_retry("transition_status", self.max_attempts, || {
            let trip_id = trip_id.to_string();
            self.unit_of_work.run(move |tx| {
                let from = tx.trip_for_update(&trip_id)?.status;
                let trip = trips_registry::transition_status(tx, &trip_id, status, now_utc())?;
                Ok((from, trip))
            })
        })
        .await?;
        self.event_sink.emit(DomainEvent::trip_status_changed(
            trip.id.clone(),
            from,
            trip.status,
        ));
        Ok(trip)
    }

    fn get_trip(&self, trip_id: &str) -> Result<Trip> {
        self.repository.get_trip(trip_id)
    }

    fn list_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>> {
        self.repository.list_trips(filter)
    }

    fn list_bids(&self, trip_id: &str) -> Result<Vec<TripBid>> {
        self.repository.list_bids(trip_id)
    }
}
