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

//! The base schedule : vehicle journeys as planned, before any
//! realtime amendment.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::time::SecondsSinceDayStart;

pub const DEFAULT_LINE_ID: &str = "default_line";
pub const DEFAULT_PHYSICAL_MODE_ID: &str = "default_physical_mode";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseStopTime {
    pub stop_id: String,
    pub arrival: SecondsSinceDayStart,
    pub departure: SecondsSinceDayStart,
}

#[derive(Debug, Clone)]
pub struct BaseVehicleJourney {
    pub id: String,
    pub line_id: String,
    pub physical_mode_id: String,
    pub headsign: Option<String>,
    pub stop_times: Vec<BaseStopTime>,
    pub valid_dates: BTreeSet<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct BaseModel {
    vehicle_journeys: Vec<BaseVehicleJourney>,
    id_to_idx: HashMap<String, usize>,
    physical_modes: BTreeSet<String>,
}

impl BaseModel {
    pub fn vehicle_journey(&self, vehicle_journey_id: &str) -> Option<&BaseVehicleJourney> {
        self.id_to_idx
            .get(vehicle_journey_id)
            .map(|idx| &self.vehicle_journeys[*idx])
    }

    pub fn contains_vehicle_journey(&self, vehicle_journey_id: &str) -> bool {
        self.id_to_idx.contains_key(vehicle_journey_id)
    }

    /// Whether the vehicle journey runs on `date` in the base schedule.
    pub fn trip_exists(&self, vehicle_journey_id: &str, date: &NaiveDate) -> bool {
        self.vehicle_journey(vehicle_journey_id)
            .map_or(false, |vehicle_journey| {
                vehicle_journey.valid_dates.contains(date)
            })
    }

    pub fn contains_physical_mode(&self, physical_mode_id: &str) -> bool {
        self.physical_modes.contains(physical_mode_id)
    }

    pub fn stop_times(&self, vehicle_journey_id: &str) -> Option<&[BaseStopTime]> {
        self.vehicle_journey(vehicle_journey_id)
            .map(|vehicle_journey| vehicle_journey.stop_times.as_slice())
    }

    pub fn line_of(&self, vehicle_journey_id: &str) -> Option<&str> {
        self.vehicle_journey(vehicle_journey_id)
            .map(|vehicle_journey| vehicle_journey.line_id.as_str())
    }

    pub fn physical_mode_of(&self, vehicle_journey_id: &str) -> Option<&str> {
        self.vehicle_journey(vehicle_journey_id)
            .map(|vehicle_journey| vehicle_journey.physical_mode_id.as_str())
    }

    pub fn headsign_of(&self, vehicle_journey_id: &str) -> Option<&str> {
        self.vehicle_journey(vehicle_journey_id)
            .and_then(|vehicle_journey| vehicle_journey.headsign.as_deref())
    }
}

/// Builder used to easily create a `BaseModel` in tests.
///
/// ```
/// # use fenrir::models::BaseModelBuilder;
///
/// # fn main() {
///  let model = BaseModelBuilder::new()
///      .vj("vjA", |vj| {
///          vj.st("stop_point:stopA", "08:00:00")
///            .st("stop_point:stopB", "08:05:00")
///            .valid_on("2021-01-01");
///      })
///      .build();
/// # }
/// ```
///
/// Time and date literals are parsed eagerly and panic when malformed,
/// which is fine for a test fixture.
pub struct BaseModelBuilder {
    vehicle_journeys: Vec<BaseVehicleJourney>,
    physical_modes: BTreeSet<String>,
}

impl Default for BaseModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseModelBuilder {
    pub fn new() -> Self {
        Self {
            vehicle_journeys: Vec::new(),
            physical_modes: BTreeSet::from([DEFAULT_PHYSICAL_MODE_ID.to_string()]),
        }
    }

    pub fn physical_mode(mut self, physical_mode_id: &str) -> Self {
        self.physical_modes.insert(physical_mode_id.to_string());
        self
    }

    pub fn vj<VjIniter>(mut self, id: &str, vj_initer: VjIniter) -> Self
    where
        VjIniter: FnOnce(&mut VehicleJourneyBuilder),
    {
        let mut vj_builder = VehicleJourneyBuilder {
            vehicle_journey: BaseVehicleJourney {
                id: id.to_string(),
                line_id: DEFAULT_LINE_ID.to_string(),
                physical_mode_id: DEFAULT_PHYSICAL_MODE_ID.to_string(),
                headsign: None,
                stop_times: Vec::new(),
                valid_dates: BTreeSet::new(),
            },
        };
        vj_initer(&mut vj_builder);
        self.physical_modes
            .insert(vj_builder.vehicle_journey.physical_mode_id.clone());
        self.vehicle_journeys.push(vj_builder.vehicle_journey);
        self
    }

    pub fn build(self) -> BaseModel {
        let id_to_idx = self
            .vehicle_journeys
            .iter()
            .enumerate()
            .map(|(idx, vehicle_journey)| (vehicle_journey.id.clone(), idx))
            .collect();
        BaseModel {
            vehicle_journeys: self.vehicle_journeys,
            id_to_idx,
            physical_modes: self.physical_modes,
        }
    }
}

pub struct VehicleJourneyBuilder {
    vehicle_journey: BaseVehicleJourney,
}

impl VehicleJourneyBuilder {
    pub fn line(&mut self, line_id: &str) -> &mut Self {
        self.vehicle_journey.line_id = line_id.to_string();
        self
    }

    pub fn physical_mode(&mut self, physical_mode_id: &str) -> &mut Self {
        self.vehicle_journey.physical_mode_id = physical_mode_id.to_string();
        self
    }

    pub fn headsign(&mut self, headsign: &str) -> &mut Self {
        self.vehicle_journey.headsign = Some(headsign.to_string());
        self
    }

    /// Adds a stop time with the same arrival and departure time.
    pub fn st(&mut self, stop_id: &str, time: &str) -> &mut Self {
        self.st_arrival_departure(stop_id, time, time)
    }

    pub fn st_arrival_departure(
        &mut self,
        stop_id: &str,
        arrival: &str,
        departure: &str,
    ) -> &mut Self {
        let arrival: SecondsSinceDayStart = arrival.parse().unwrap();
        let departure: SecondsSinceDayStart = departure.parse().unwrap();
        self.vehicle_journey.stop_times.push(BaseStopTime {
            stop_id: stop_id.to_string(),
            arrival,
            departure,
        });
        self
    }

    pub fn valid_on(&mut self, date: &str) -> &mut Self {
        let date: NaiveDate = date.parse().unwrap();
        self.vehicle_journey.valid_dates.insert(date);
        self
    }
}
