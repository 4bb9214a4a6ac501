// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia

//! Realtime trip updates as received from a feed, and their
//! confrontation with the base schedule : amended stop times and the
//! severity derived from them.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::base_model::BaseVehicleJourney;

/// Severity of a disruption on a trip, in the GTFS-RT vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    NoService,
    ReducedService,
    SignificantDelays,
    Detour,
    AdditionalService,
    ModifiedService,
    UnknownEffect,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::NoService => write!(f, "NO_SERVICE"),
            Effect::ReducedService => write!(f, "REDUCED_SERVICE"),
            Effect::SignificantDelays => write!(f, "SIGNIFICANT_DELAYS"),
            Effect::Detour => write!(f, "DETOUR"),
            Effect::AdditionalService => write!(f, "ADDITIONAL_SERVICE"),
            Effect::ModifiedService => write!(f, "MODIFIED_SERVICE"),
            Effect::UnknownEffect => write!(f, "UNKNOWN_EFFECT"),
        }
    }
}

/// Status carried by a feed on a single arrival or departure event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopTimeEventStatus {
    #[default]
    Scheduled,
    Added,
    AddedForDetour,
    Deleted,
    DeletedForDetour,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimeEvent {
    pub time: NaiveDateTime,
    pub delay: Duration,
    pub status: StopTimeEventStatus,
}

impl StopTimeEvent {
    pub fn on_time(time: NaiveDateTime) -> Self {
        Self {
            time,
            delay: Duration::zero(),
            status: StopTimeEventStatus::Scheduled,
        }
    }

    pub fn delayed(time: NaiveDateTime, delay: Duration) -> Self {
        Self {
            time,
            delay,
            status: StopTimeEventStatus::Scheduled,
        }
    }

    pub fn with_status(time: NaiveDateTime, status: StopTimeEventStatus) -> Self {
        Self {
            time,
            delay: Duration::zero(),
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimeUpdate {
    pub stop_id: String,
    pub arrival: Option<StopTimeEvent>,
    pub departure: Option<StopTimeEvent>,
    pub cause: Option<String>,
}

/// One realtime message about one trip on one service date. The feed
/// always describes the full amended stop sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripUpdate {
    pub disruption_id: String,
    pub vehicle_journey_id: String,
    pub reference_date: NaiveDate,
    pub contributor: Option<String>,
    /// Severity hint carried by the feed. When absent, the severity is
    /// derived from the amended stop times.
    pub effect: Option<Effect>,
    pub physical_mode_id: Option<String>,
    pub headsign: Option<String>,
    pub stop_time_updates: Vec<StopTimeUpdate>,
}

/// Status of a stop time after confrontation with the base schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTimeStatus {
    Unchanged,
    Delayed,
    Added,
    AddedForDetour,
    Deleted,
    DeletedForDetour,
}

impl StopTimeStatus {
    pub fn is_dropped(&self) -> bool {
        matches!(self, StopTimeStatus::Deleted | StopTimeStatus::DeletedForDetour)
    }

    fn is_detour(&self) -> bool {
        matches!(
            self,
            StopTimeStatus::AddedForDetour | StopTimeStatus::DeletedForDetour
        )
    }
}

impl std::fmt::Display for StopTimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopTimeStatus::Unchanged => write!(f, "unchanged"),
            StopTimeStatus::Delayed => write!(f, "delayed"),
            StopTimeStatus::Added => write!(f, "added"),
            StopTimeStatus::AddedForDetour => write!(f, "added_for_detour"),
            StopTimeStatus::Deleted => write!(f, "deleted"),
            StopTimeStatus::DeletedForDetour => write!(f, "deleted_for_detour"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmendedStopTime {
    pub stop_id: String,
    pub base_arrival: Option<NaiveDateTime>,
    pub base_departure: Option<NaiveDateTime>,
    /// None when the stop is dropped.
    pub amended_arrival: Option<NaiveDateTime>,
    pub amended_departure: Option<NaiveDateTime>,
    pub arrival_status: StopTimeStatus,
    pub departure_status: StopTimeStatus,
    pub cause: Option<String>,
}

impl AmendedStopTime {
    pub fn is_dropped(&self) -> bool {
        self.arrival_status.is_dropped() && self.departure_status.is_dropped()
    }

    pub fn arrival_delay(&self) -> Option<Duration> {
        match (self.base_arrival, self.amended_arrival) {
            (Some(base), Some(amended)) => Some(amended.signed_duration_since(base)),
            _ => None,
        }
    }

    pub fn departure_delay(&self) -> Option<Duration> {
        match (self.base_departure, self.amended_departure) {
            (Some(base), Some(amended)) => Some(amended.signed_duration_since(base)),
            _ => None,
        }
    }

    fn has_delay(&self) -> bool {
        self.arrival_status == StopTimeStatus::Delayed
            || self.departure_status == StopTimeStatus::Delayed
    }
}

/// Confronts the stop time updates of a message with the base schedule
/// of the trip (None for a trip absent from the base schedule).
///
/// Base stop times are matched by stop id with a forward cursor, so a
/// trip serving the same stop twice matches each occurrence once.
pub fn amend_stop_times(
    update: &TripUpdate,
    base_vehicle_journey: Option<&BaseVehicleJourney>,
) -> Vec<AmendedStopTime> {
    let base_stop_times = base_vehicle_journey
        .map(|vehicle_journey| vehicle_journey.stop_times.as_slice())
        .unwrap_or(&[]);
    let mut base_cursor = 0usize;
    let mut amended = Vec::with_capacity(update.stop_time_updates.len());

    for stop_time_update in &update.stop_time_updates {
        let is_new_stop = matches!(
            event_status(stop_time_update),
            StopTimeEventStatus::Added | StopTimeEventStatus::AddedForDetour
        );
        let base_match = if is_new_stop {
            None
        } else {
            base_stop_times[base_cursor..]
                .iter()
                .position(|base| base.stop_id == stop_time_update.stop_id)
                .map(|offset| {
                    let found = base_cursor + offset;
                    base_cursor = found + 1;
                    &base_stop_times[found]
                })
        };
        let (base_arrival, base_departure) = match base_match {
            Some(base) => (
                Some(base.arrival.to_datetime(&update.reference_date)),
                Some(base.departure.to_datetime(&update.reference_date)),
            ),
            None => (None, None),
        };

        let (amended_arrival, arrival_status) = amend_event(
            stop_time_update.arrival.as_ref(),
            base_arrival,
            base_match.is_some(),
        );
        let (amended_departure, departure_status) = amend_event(
            stop_time_update.departure.as_ref(),
            base_departure,
            base_match.is_some(),
        );

        amended.push(AmendedStopTime {
            stop_id: stop_time_update.stop_id.clone(),
            base_arrival,
            base_departure,
            amended_arrival,
            amended_departure,
            arrival_status,
            departure_status,
            cause: stop_time_update.cause.clone(),
        });
    }

    amended
}

fn event_status(stop_time_update: &StopTimeUpdate) -> StopTimeEventStatus {
    stop_time_update
        .arrival
        .as_ref()
        .or(stop_time_update.departure.as_ref())
        .map(|event| event.status)
        .unwrap_or_default()
}

fn amend_event(
    event: Option<&StopTimeEvent>,
    base_time: Option<NaiveDateTime>,
    known_in_base: bool,
) -> (Option<NaiveDateTime>, StopTimeStatus) {
    match event {
        None => (base_time, StopTimeStatus::Unchanged),
        Some(event) => match event.status {
            StopTimeEventStatus::Deleted => (None, StopTimeStatus::Deleted),
            StopTimeEventStatus::DeletedForDetour => (None, StopTimeStatus::DeletedForDetour),
            StopTimeEventStatus::Added => (Some(event.time), StopTimeStatus::Added),
            StopTimeEventStatus::AddedForDetour => (Some(event.time), StopTimeStatus::AddedForDetour),
            StopTimeEventStatus::Scheduled => {
                let status = if !known_in_base {
                    StopTimeStatus::Added
                } else if event.delay != Duration::zero() || Some(event.time) != base_time {
                    StopTimeStatus::Delayed
                } else {
                    StopTimeStatus::Unchanged
                };
                (Some(event.time), status)
            }
        },
    }
}

/// Derives the severity of an amendment. `None` means the message
/// changes nothing.
pub fn aggregate_effect(
    amended_stop_times: &[AmendedStopTime],
    trip_existed_in_base: bool,
) -> Option<Effect> {
    if amended_stop_times.is_empty() {
        return None;
    }
    if amended_stop_times.iter().all(AmendedStopTime::is_dropped) {
        return Some(Effect::NoService);
    }
    let any_detour = amended_stop_times.iter().any(|stop_time| {
        stop_time.arrival_status.is_detour() || stop_time.departure_status.is_detour()
    });
    if any_detour {
        return Some(Effect::Detour);
    }
    let any_added = amended_stop_times.iter().any(|stop_time| {
        stop_time.arrival_status == StopTimeStatus::Added
            || stop_time.departure_status == StopTimeStatus::Added
    });
    if any_added {
        return if trip_existed_in_base {
            Some(Effect::ModifiedService)
        } else {
            Some(Effect::AdditionalService)
        };
    }
    let any_deleted = amended_stop_times.iter().any(|stop_time| {
        stop_time.arrival_status.is_dropped() || stop_time.departure_status.is_dropped()
    });
    if any_deleted {
        return Some(Effect::ReducedService);
    }
    if amended_stop_times.iter().any(AmendedStopTime::has_delay) {
        return Some(Effect::SignificantDelays);
    }
    None
}

/// A recorded disruption, kept for client queries long after the trip
/// versions it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disruption {
    pub id: String,
    pub contributor: Option<String>,
    pub effect: Effect,
    pub vehicle_journey_id: String,
    pub reference_date: NaiveDate,
}
