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

//! Tagging of journeys by fallback mode and direct path status.
//! Tags are additive : re-tagging an already tagged journey is a no-op.

use crate::response::{Journey, Mode, TAG_NON_PT};

/// When a journey uses several fallback modes, the tag of the "heaviest"
/// mode wins. Walking is never in this list : it only tags journeys with
/// no heavier fallback.
pub const MODE_TAG_PRECEDENCE: [Mode; 5] =
    [Mode::Car, Mode::Ridesharing, Mode::Taxi, Mode::Bss, Mode::Bike];

/// Tag of a journey using `mode` as (one of) its fallback(s).
pub fn mode_tag(mode: Mode) -> &'static str {
    match mode {
        Mode::Walking => "walking",
        Mode::Bike => "bike",
        Mode::Bss => "bss",
        Mode::Car => "car",
        Mode::Ridesharing => "ridesharing",
        Mode::Taxi => "taxi",
    }
}

pub fn tag_by_mode(journeys: &mut [Journey]) {
    for journey in journeys.iter_mut() {
        tag_journey_by_mode(journey);
    }
}

fn tag_journey_by_mode(journey: &mut Journey) {
    let street_modes: Vec<Mode> = journey
        .sections
        .iter()
        .filter_map(|section| section.street_mode())
        .collect();
    for mode in MODE_TAG_PRECEDENCE {
        if street_modes.contains(&mode) {
            journey.tag(mode_tag(mode));
            return;
        }
    }
    if street_modes.contains(&Mode::Walking) {
        journey.tag(mode_tag(Mode::Walking));
    }
}

/// Tags journeys made only of street network sections with `non_pt`
/// and `non_pt_{mode}`.
pub fn tag_direct_paths(journeys: &mut [Journey]) {
    for journey in journeys.iter_mut() {
        if !journey.is_direct_path() {
            continue;
        }
        let mode_tag = journey
            .sections
            .iter()
            .filter_map(|section| section.street_mode())
            .map(mode_tag)
            .next();
        journey.tag(TAG_NON_PT);
        if let Some(mode_tag) = mode_tag {
            journey.tag(format!("non_pt_{}", mode_tag));
        }
    }
}
