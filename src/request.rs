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

//! Journey request parameters, and the derivation of the set of
//! engine calls (one per usable fallback mode combination) a request
//! expands into.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::response::Mode;

#[derive(Debug, Clone)]
pub struct JourneyRequest {
    pub datetime: NaiveDateTime,
    /// true : depart after `datetime`; false : arrive before `datetime`.
    pub clockwise: bool,
    pub max_nb_journeys: Option<usize>,
    /// In debug mode, journeys tagged for deletion stay in the response
    /// with their deletion reason.
    pub debug: bool,
    pub origin_modes: Vec<Mode>,
    pub destination_modes: Vec<Mode>,
    pub direct_path_modes: Vec<Mode>,
    pub direct_path: DirectPathPolicy,
    pub max_additional_connections: Option<u32>,
}

impl JourneyRequest {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            clockwise: true,
            max_nb_journeys: None,
            debug: false,
            origin_modes: vec![Mode::Walking],
            destination_modes: vec![Mode::Walking],
            direct_path_modes: Vec::new(),
            direct_path: DirectPathPolicy::Indifferent,
            max_additional_connections: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectPathPolicy {
    /// No direct path wanted.
    None,
    /// Direct paths and public transport journeys both wanted.
    Indifferent,
    /// Only direct paths wanted.
    Only,
    /// Only direct paths wanted, but each fallback mode gets its own call.
    OnlyWithAlternatives,
}

impl std::fmt::Display for DirectPathPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectPathPolicy::None => write!(f, "none"),
            DirectPathPolicy::Indifferent => write!(f, "indifferent"),
            DirectPathPolicy::Only => write!(f, "only"),
            DirectPathPolicy::OnlyWithAlternatives => write!(f, "only_with_alternatives"),
        }
    }
}

impl std::str::FromStr for DirectPathPolicy {
    type Err = BadDirectPathPolicy;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let policy = match s {
            "none" => DirectPathPolicy::None,
            "indifferent" => DirectPathPolicy::Indifferent,
            "only" => DirectPathPolicy::Only,
            "only_with_alternatives" => DirectPathPolicy::OnlyWithAlternatives,
            _ => {
                return Err(BadDirectPathPolicy {
                    string: s.to_string(),
                })
            }
        };
        Ok(policy)
    }
}

#[derive(Debug)]
pub struct BadDirectPathPolicy {
    string: String,
}

impl std::error::Error for BadDirectPathPolicy {}

impl std::fmt::Display for BadDirectPathPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bad direct path policy `{}`. Expected one of `none`, `indifferent`, `only`, \
             `only_with_alternatives`.",
            self.string
        )
    }
}

/// One call to the routing engine : a fallback mode on each side and
/// the direct path policy applied to this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EngineCall {
    pub origin_mode: Mode,
    pub destination_mode: Mode,
    pub direct_path: DirectPathPolicy,
}

impl EngineCall {
    fn new(origin_mode: Mode, destination_mode: Mode, direct_path: DirectPathPolicy) -> Self {
        Self {
            origin_mode,
            destination_mode,
            direct_path,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RequestError {
    IncompatibleModes {
        origin_modes: Vec<Mode>,
        destination_modes: Vec<Mode>,
    },
}

impl std::error::Error for RequestError {}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::IncompatibleModes {
                origin_modes,
                destination_modes,
            } => {
                write!(
                    f,
                    "No usable mode combination between origin modes {:?} and destination \
                     modes {:?}.",
                    origin_modes, destination_modes
                )
            }
        }
    }
}

/// (origin, destination) mode pairs usable for a journey with public
/// transport in the middle. The ridesharing/ridesharing pair is absent :
/// it is reached only through the same-mode fallback.
const ALLOWED_MODE_PAIRS: [(Mode, Mode); 15] = [
    (Mode::Walking, Mode::Walking),
    (Mode::Bike, Mode::Bike),
    (Mode::Bss, Mode::Bss),
    (Mode::Car, Mode::Car),
    (Mode::Taxi, Mode::Taxi),
    (Mode::Bike, Mode::Walking),
    (Mode::Bike, Mode::Bss),
    (Mode::Bike, Mode::Taxi),
    (Mode::Car, Mode::Bss),
    (Mode::Taxi, Mode::Bss),
    (Mode::Taxi, Mode::Walking),
    (Mode::Taxi, Mode::Ridesharing),
    (Mode::Ridesharing, Mode::Walking),
    (Mode::Ridesharing, Mode::Bss),
    (Mode::Ridesharing, Mode::Taxi),
];

fn is_allowed_pair(origin_mode: Mode, destination_mode: Mode) -> bool {
    ALLOWED_MODE_PAIRS.contains(&(origin_mode, destination_mode))
}

/// Mode pair product, restricted to usable pairs. When the product is
/// empty, falls back to same-mode pairs present on both sides.
fn mode_pairs(request: &JourneyRequest) -> Result<BTreeSet<(Mode, Mode)>, RequestError> {
    let mut pairs: BTreeSet<(Mode, Mode)> = BTreeSet::new();
    for origin_mode in &request.origin_modes {
        for destination_mode in &request.destination_modes {
            if is_allowed_pair(*origin_mode, *destination_mode) {
                pairs.insert((*origin_mode, *destination_mode));
            }
        }
    }
    if pairs.is_empty() {
        for mode in &request.origin_modes {
            if request.destination_modes.contains(mode) {
                pairs.insert((*mode, *mode));
            }
        }
    }
    if pairs.is_empty() {
        return Err(RequestError::IncompatibleModes {
            origin_modes: request.origin_modes.clone(),
            destination_modes: request.destination_modes.clone(),
        });
    }
    Ok(pairs)
}

pub fn engine_calls(request: &JourneyRequest) -> Result<BTreeSet<EngineCall>, RequestError> {
    let mut calls: BTreeSet<EngineCall> = BTreeSet::new();
    // a pure direct path request needs no usable mode pair at all
    if matches!(
        request.direct_path,
        DirectPathPolicy::Only | DirectPathPolicy::OnlyWithAlternatives
    ) && !request.direct_path_modes.is_empty()
    {
        for mode in &request.direct_path_modes {
            calls.insert(EngineCall::new(*mode, *mode, DirectPathPolicy::Only));
        }
        return Ok(calls);
    }
    let pairs = mode_pairs(request)?;
    match request.direct_path {
        DirectPathPolicy::None => {
            // direct path modes are irrelevant when no direct path is wanted
            for (origin_mode, destination_mode) in pairs {
                calls.insert(EngineCall::new(
                    origin_mode,
                    destination_mode,
                    DirectPathPolicy::None,
                ));
            }
        }
        DirectPathPolicy::Only | DirectPathPolicy::OnlyWithAlternatives => {
            for (origin_mode, destination_mode) in pairs {
                calls.insert(EngineCall::new(
                    origin_mode,
                    destination_mode,
                    DirectPathPolicy::Only,
                ));
            }
        }
        DirectPathPolicy::Indifferent => {
            for (origin_mode, destination_mode) in &pairs {
                calls.insert(EngineCall::new(
                    *origin_mode,
                    *destination_mode,
                    DirectPathPolicy::Indifferent,
                ));
            }
            for mode in &request.direct_path_modes {
                // a same-mode call already computes this direct path
                if !pairs.contains(&(*mode, *mode)) {
                    calls.insert(EngineCall::new(*mode, *mode, DirectPathPolicy::Only));
                }
            }
        }
    }
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(origin_modes: Vec<Mode>, destination_modes: Vec<Mode>) -> JourneyRequest {
        let datetime = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut request = JourneyRequest::new(datetime);
        request.origin_modes = origin_modes;
        request.destination_modes = destination_modes;
        request
    }

    fn pairs_of(calls: &BTreeSet<EngineCall>) -> BTreeSet<(Mode, Mode)> {
        calls
            .iter()
            .map(|call| (call.origin_mode, call.destination_mode))
            .collect()
    }

    #[test]
    fn walking_only() {
        let request = request(vec![Mode::Walking], vec![Mode::Walking]);
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            pairs_of(&calls),
            BTreeSet::from([(Mode::Walking, Mode::Walking)])
        );
    }

    #[test]
    fn bike_origin_walking_destination() {
        let request = request(vec![Mode::Bike], vec![Mode::Walking]);
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            pairs_of(&calls),
            BTreeSet::from([(Mode::Bike, Mode::Walking)])
        );
    }

    #[test]
    fn walking_origin_bike_destination_is_incompatible() {
        let request = request(vec![Mode::Walking], vec![Mode::Bike]);
        assert!(matches!(
            engine_calls(&request),
            Err(RequestError::IncompatibleModes { .. })
        ));
    }

    #[test]
    fn ridesharing_both_sides_through_fallback() {
        let request = request(vec![Mode::Ridesharing], vec![Mode::Ridesharing]);
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            pairs_of(&calls),
            BTreeSet::from([(Mode::Ridesharing, Mode::Ridesharing)])
        );
    }

    #[test]
    fn ridesharing_pair_dropped_when_other_pairs_exist() {
        let request = request(
            vec![Mode::Walking, Mode::Ridesharing],
            vec![Mode::Walking, Mode::Ridesharing],
        );
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            pairs_of(&calls),
            BTreeSet::from([
                (Mode::Walking, Mode::Walking),
                (Mode::Ridesharing, Mode::Walking),
            ])
        );
    }

    #[test]
    fn car_origin_walking_destination_is_incompatible() {
        let request = request(vec![Mode::Car], vec![Mode::Walking]);
        assert!(matches!(
            engine_calls(&request),
            Err(RequestError::IncompatibleModes { .. })
        ));
    }

    #[test]
    fn direct_path_none_ignores_direct_path_modes() {
        let mut request = request(vec![Mode::Walking], vec![Mode::Walking]);
        request.direct_path = DirectPathPolicy::None;
        request.direct_path_modes = vec![Mode::Bike];
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            calls,
            BTreeSet::from([EngineCall::new(
                Mode::Walking,
                Mode::Walking,
                DirectPathPolicy::None
            )])
        );
    }

    #[test]
    fn direct_path_only_uses_direct_path_modes() {
        let mut request = request(vec![Mode::Walking], vec![Mode::Walking]);
        request.direct_path = DirectPathPolicy::Only;
        request.direct_path_modes = vec![Mode::Bike, Mode::Car];
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            calls,
            BTreeSet::from([
                EngineCall::new(Mode::Bike, Mode::Bike, DirectPathPolicy::Only),
                EngineCall::new(Mode::Car, Mode::Car, DirectPathPolicy::Only),
            ])
        );
    }

    #[test]
    fn direct_path_only_needs_no_fallback_modes() {
        let mut request = request(Vec::new(), Vec::new());
        request.direct_path = DirectPathPolicy::OnlyWithAlternatives;
        request.direct_path_modes = vec![Mode::Bike];
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            calls,
            BTreeSet::from([EngineCall::new(
                Mode::Bike,
                Mode::Bike,
                DirectPathPolicy::Only
            )])
        );
    }

    #[test]
    fn direct_path_only_without_modes_tags_the_product() {
        let mut request = request(vec![Mode::Walking], vec![Mode::Walking]);
        request.direct_path = DirectPathPolicy::Only;
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            calls,
            BTreeSet::from([EngineCall::new(
                Mode::Walking,
                Mode::Walking,
                DirectPathPolicy::Only
            )])
        );
    }

    #[test]
    fn direct_path_indifferent_adds_extra_direct_path_calls() {
        let mut request = request(vec![Mode::Walking], vec![Mode::Walking]);
        request.direct_path_modes = vec![Mode::Walking, Mode::Car];
        let calls = engine_calls(&request).unwrap();
        assert_eq!(
            calls,
            BTreeSet::from([
                EngineCall::new(Mode::Walking, Mode::Walking, DirectPathPolicy::Indifferent),
                EngineCall::new(Mode::Car, Mode::Car, DirectPathPolicy::Only),
            ])
        );
    }
}
