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

//! Reconciliation of realtime trip updates with the base schedule.
//!
//! Each (vehicle journey, service date) accumulates a versioned history
//! of amended trips; the last version is the one journeys are built on.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::RealTimeConfig;

use super::base_model::BaseModel;
use super::disruption::{
    aggregate_effect, amend_stop_times, AmendedStopTime, Disruption, Effect, StopTimeStatus,
    TripUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripInstanceKind {
    /// Amends a trip of the base schedule.
    Modified,
    /// A trip the base schedule does not run on this date.
    Added,
}

impl std::fmt::Display for TripInstanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripInstanceKind::Modified => write!(f, "modified"),
            TripInstanceKind::Added => write!(f, "added"),
        }
    }
}

/// Identity of one version of one amended trip. Its `Display` form is
/// the composite id exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripInstanceId {
    pub vehicle_journey_id: String,
    pub kind: TripInstanceKind,
    pub version: u32,
    pub disruption_id: String,
}

impl std::fmt::Display for TripInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vehicle_journey:{}:{}:{}:{}",
            self.vehicle_journey_id, self.kind, self.version, self.disruption_id
        )
    }
}

/// One version of an amended trip.
#[derive(Debug, Clone)]
pub struct TripInstance {
    pub id: TripInstanceId,
    pub reference_date: NaiveDate,
    pub effect: Effect,
    pub stop_times: Vec<AmendedStopTime>,
    pub physical_mode_id: Option<String>,
    pub headsign: Option<String>,
    pub line_id: Option<String>,
    /// Index of the disruption that produced this version, in
    /// `RealTimeModel::disruptions`.
    pub disruption_idx: usize,
}

impl TripInstance {
    /// The stop times the trip actually serves.
    pub fn effective_stop_times(&self) -> impl Iterator<Item = &AmendedStopTime> {
        self.stop_times
            .iter()
            .filter(|stop_time| !stop_time.is_dropped())
    }

    pub fn is_cancelled(&self) -> bool {
        self.effect == Effect::NoService
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TripKey {
    vehicle_journey_id: String,
    reference_date: NaiveDate,
}

#[derive(Debug, Default)]
struct TripHistory {
    versions: Vec<TripInstance>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new trip version was created.
    Applied(TripInstanceId),
    /// The active version already carries this exact amendment.
    Unchanged,
    /// The message changes nothing on an un-amended trip.
    Suppressed,
    Rejected(RejectionCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionCause {
    AdditionDisabled,
    IdentityCollision,
    TripAbsentInBase,
    UnknownPhysicalMode,
    EmptyStopTimes,
}

impl std::fmt::Display for RejectionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionCause::AdditionDisabled => {
                write!(f, "realtime trip additions are disabled")
            }
            RejectionCause::IdentityCollision => {
                write!(
                    f,
                    "an added trip collides with a base trip running on the same date"
                )
            }
            RejectionCause::TripAbsentInBase => {
                write!(f, "the trip is absent from the base schedule")
            }
            RejectionCause::UnknownPhysicalMode => {
                write!(f, "the physical mode is unknown to the base schedule")
            }
            RejectionCause::EmptyStopTimes => {
                write!(f, "the update carries no stop time")
            }
        }
    }
}

/// Accumulated realtime state on top of a base schedule.
///
/// The model performs no I/O and no locking : callers must serialize
/// updates per (vehicle journey, service date). Updates on distinct
/// keys commute.
#[derive(Debug, Default)]
pub struct RealTimeModel {
    histories: HashMap<TripKey, TripHistory>,
    instances_by_id: HashMap<String, (TripKey, usize)>,
    disruptions: Vec<Disruption>,
}

impl RealTimeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles one trip update with the base schedule. Rejections
    /// are logged and acknowledged : a bad message must not poison the
    /// feed.
    pub fn handle_trip_update(
        &mut self,
        base_model: &BaseModel,
        update: TripUpdate,
        config: &RealTimeConfig,
    ) -> UpdateOutcome {
        if let Some(physical_mode_id) = &update.physical_mode_id {
            if !base_model.contains_physical_mode(physical_mode_id) {
                warn!(
                    "Rejecting disruption {} on trip {} : unknown physical mode {}",
                    update.disruption_id, update.vehicle_journey_id, physical_mode_id
                );
                return UpdateOutcome::Rejected(RejectionCause::UnknownPhysicalMode);
            }
        }

        if update.effect == Some(Effect::NoService) {
            return self.handle_cancellation(base_model, update);
        }

        if update.stop_time_updates.is_empty() {
            warn!(
                "Rejecting disruption {} on trip {} : no stop time",
                update.disruption_id, update.vehicle_journey_id
            );
            return UpdateOutcome::Rejected(RejectionCause::EmptyStopTimes);
        }

        let runs_in_base = base_model.trip_exists(&update.vehicle_journey_id, &update.reference_date);

        if update.effect == Some(Effect::AdditionalService) && runs_in_base {
            warn!(
                "Rejecting disruption {} : added trip {} collides with a base trip on {}",
                update.disruption_id, update.vehicle_journey_id, update.reference_date
            );
            return UpdateOutcome::Rejected(RejectionCause::IdentityCollision);
        }

        let kind = if runs_in_base {
            TripInstanceKind::Modified
        } else {
            if !config.realtime_addition_enabled {
                warn!(
                    "Rejecting disruption {} : trip {} does not run on {} and realtime \
                     additions are disabled",
                    update.disruption_id, update.vehicle_journey_id, update.reference_date
                );
                return UpdateOutcome::Rejected(RejectionCause::AdditionDisabled);
            }
            TripInstanceKind::Added
        };

        let base_vehicle_journey = if runs_in_base {
            base_model.vehicle_journey(&update.vehicle_journey_id)
        } else {
            None
        };
        let amended = amend_stop_times(&update, base_vehicle_journey);
        let derived_effect = aggregate_effect(&amended, runs_in_base);

        let key = TripKey {
            vehicle_journey_id: update.vehicle_journey_id.clone(),
            reference_date: update.reference_date,
        };
        let active = self.active_version(&key);

        let effect = match derived_effect {
            Some(effect) => effect,
            None => match active {
                // the base schedule is already right, nothing to record
                None => {
                    debug!(
                        "Suppressing disruption {} on trip {} : no change on an un-amended trip",
                        update.disruption_id, update.vehicle_journey_id
                    );
                    return UpdateOutcome::Suppressed;
                }
                // a no-change message over an active amendment reverts it
                Some(_) => Effect::UnknownEffect,
            },
        };

        if let Some(active) = active {
            if active.id.disruption_id == update.disruption_id
                && active.stop_times == amended
                && active.effect == effect
            {
                debug!(
                    "Disruption {} on trip {} is already applied",
                    update.disruption_id, update.vehicle_journey_id
                );
                return UpdateOutcome::Unchanged;
            }
        }

        self.apply_version(base_model, &update, key, kind, effect, amended)
    }

    fn handle_cancellation(&mut self, base_model: &BaseModel, update: TripUpdate) -> UpdateOutcome {
        let key = TripKey {
            vehicle_journey_id: update.vehicle_journey_id.clone(),
            reference_date: update.reference_date,
        };
        let runs_in_base =
            base_model.trip_exists(&update.vehicle_journey_id, &update.reference_date);
        if !runs_in_base && self.active_version(&key).is_none() {
            warn!(
                "Rejecting cancellation {} : trip {} does not run on {}",
                update.disruption_id, update.vehicle_journey_id, update.reference_date
            );
            return UpdateOutcome::Rejected(RejectionCause::TripAbsentInBase);
        }

        // keep the base stop times in the record, all marked dropped
        let base_stop_times = base_model
            .stop_times(&update.vehicle_journey_id)
            .unwrap_or(&[]);
        let amended: Vec<AmendedStopTime> = base_stop_times
            .iter()
            .map(|base| AmendedStopTime {
                stop_id: base.stop_id.clone(),
                base_arrival: Some(base.arrival.to_datetime(&update.reference_date)),
                base_departure: Some(base.departure.to_datetime(&update.reference_date)),
                amended_arrival: None,
                amended_departure: None,
                arrival_status: StopTimeStatus::Deleted,
                departure_status: StopTimeStatus::Deleted,
                cause: None,
            })
            .collect();

        if let Some(active) = self.active_version(&key) {
            if active.id.disruption_id == update.disruption_id
                && active.effect == Effect::NoService
            {
                debug!(
                    "Cancellation {} of trip {} is already applied",
                    update.disruption_id, update.vehicle_journey_id
                );
                return UpdateOutcome::Unchanged;
            }
        }

        let kind = if runs_in_base {
            TripInstanceKind::Modified
        } else {
            TripInstanceKind::Added
        };
        self.apply_version(base_model, &update, key, kind, Effect::NoService, amended)
    }

    fn apply_version(
        &mut self,
        base_model: &BaseModel,
        update: &TripUpdate,
        key: TripKey,
        kind: TripInstanceKind,
        effect: Effect,
        stop_times: Vec<AmendedStopTime>,
    ) -> UpdateOutcome {
        let disruption_idx = self.disruptions.len();
        self.disruptions.push(Disruption {
            id: update.disruption_id.clone(),
            contributor: update.contributor.clone(),
            effect,
            vehicle_journey_id: update.vehicle_journey_id.clone(),
            reference_date: update.reference_date,
        });

        let history = self.histories.entry(key.clone()).or_default();
        let version = history.versions.len() as u32;
        let id = TripInstanceId {
            vehicle_journey_id: update.vehicle_journey_id.clone(),
            kind,
            version,
            disruption_id: update.disruption_id.clone(),
        };
        let instance = TripInstance {
            id: id.clone(),
            reference_date: update.reference_date,
            effect,
            stop_times,
            physical_mode_id: update
                .physical_mode_id
                .clone()
                .or_else(|| base_model.physical_mode_of(&update.vehicle_journey_id).map(str::to_string)),
            headsign: update
                .headsign
                .clone()
                .or_else(|| base_model.headsign_of(&update.vehicle_journey_id).map(str::to_string)),
            line_id: base_model
                .line_of(&update.vehicle_journey_id)
                .map(str::to_string),
            disruption_idx,
        };
        let version_idx = history.versions.len();
        history.versions.push(instance);
        self.instances_by_id
            .insert(id.to_string(), (key, version_idx));
        info!(
            "Disruption {} applied on trip {} ({}) : {}",
            update.disruption_id, update.vehicle_journey_id, update.reference_date, effect
        );
        UpdateOutcome::Applied(id)
    }

    fn active_version(&self, key: &TripKey) -> Option<&TripInstance> {
        self.histories.get(key).and_then(|history| history.versions.last())
    }

    /// The trip version journeys are built on for this date, if any.
    pub fn active_trip(&self, vehicle_journey_id: &str, date: &NaiveDate) -> Option<&TripInstance> {
        let key = TripKey {
            vehicle_journey_id: vehicle_journey_id.to_string(),
            reference_date: *date,
        };
        self.active_version(&key)
    }

    /// Lookup by the composite id of `TripInstanceId::to_string`.
    pub fn trip_instance(&self, composite_id: &str) -> Option<&TripInstance> {
        self.instances_by_id.get(composite_id).and_then(|(key, version_idx)| {
            self.histories
                .get(key)
                .and_then(|history| history.versions.get(*version_idx))
        })
    }

    pub fn nb_of_versions(&self, vehicle_journey_id: &str, date: &NaiveDate) -> usize {
        let key = TripKey {
            vehicle_journey_id: vehicle_journey_id.to_string(),
            reference_date: *date,
        };
        self.histories
            .get(&key)
            .map_or(0, |history| history.versions.len())
    }

    pub fn disruptions(&self) -> &[Disruption] {
        &self.disruptions
    }

    pub fn disruptions_on_trip(&self, vehicle_journey_id: &str) -> Vec<&Disruption> {
        self.disruptions
            .iter()
            .filter(|disruption| disruption.vehicle_journey_id == vehicle_journey_id)
            .collect()
    }

    pub fn disruptions_on_stop(&self, stop_id: &str) -> Vec<&Disruption> {
        let mut found: Vec<&Disruption> = Vec::new();
        for history in self.histories.values() {
            for instance in &history.versions {
                let serves_stop = instance
                    .stop_times
                    .iter()
                    .any(|stop_time| stop_time.stop_id == stop_id);
                if serves_stop {
                    found.push(&self.disruptions[instance.disruption_idx]);
                }
            }
        }
        found.sort_by_key(|disruption| disruption.id.clone());
        found.dedup_by_key(|disruption| disruption.id.clone());
        found
    }

    pub fn disruptions_on_line(&self, line_id: &str) -> Vec<&Disruption> {
        let mut found: Vec<&Disruption> = Vec::new();
        for history in self.histories.values() {
            for instance in &history.versions {
                if instance.line_id.as_deref() == Some(line_id) {
                    found.push(&self.disruptions[instance.disruption_idx]);
                }
            }
        }
        found.sort_by_key(|disruption| disruption.id.clone());
        found.dedup_by_key(|disruption| disruption.id.clone());
        found
    }
}
