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
// www.navitia.io

#![allow(dead_code)]

use chrono::NaiveDateTime;
use fenrir::response::{Journey, JourneyCategory, Mode, Response, Section};
use fenrir::tagging;
use fenrir::tracing::dispatcher::DefaultGuard;

pub fn init_logger() -> DefaultGuard {
    fenrir::logger::init_test_logger()
}

pub fn datetime_from_timestamp(timestamp: i64) -> NaiveDateTime {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .expect("bad timestamp literal")
        .naive_utc()
}

/// The section palette of the fixture : index 0 is a bike leg, indexes
/// 1 to 9 are public transport legs on lines uri_1 to uri_9, index 10
/// is a walking leg.
fn fixture_section(section_idx: usize) -> Section {
    match section_idx {
        0 => Section::street_network(Mode::Bike),
        10 => Section::street_network(Mode::Walking),
        line => Section::public_transport(format!("uri_{}", line)),
    }
}

/// (arrival timestamp, category, transfers, section palette indexes),
/// around 2015-10-15 midday.
pub const FIXTURE_JOURNEYS: [(i64, JourneyCategory, i32, &[usize]); 19] = [
    (1444905000, JourneyCategory::Rapid, 2, &[1, 2, 3, 4, 10]),
    (1444905300, JourneyCategory::Rapid, 2, &[1, 2, 5, 6, 10]),
    (1444905600, JourneyCategory::Rapid, 2, &[2, 3, 4, 10]),
    (1444905900, JourneyCategory::Rapid, 2, &[2, 5, 6, 10]),
    (1444906200, JourneyCategory::Rapid, 3, &[0, 2, 3, 6, 10]),
    (1444906500, JourneyCategory::Rapid, 1, &[1, 2, 7, 10]),
    (1444906800, JourneyCategory::Rapid, 1, &[1, 2, 8, 10]),
    (1444907100, JourneyCategory::Rapid, 1, &[2, 7, 10]),
    (1444907400, JourneyCategory::Rapid, 1, &[2, 8, 10]),
    (1444907700, JourneyCategory::Rapid, 2, &[0, 2, 7, 10]),
    (1444908800, JourneyCategory::Rapid, 2, &[1, 2, 8, 9]),
    (1444909100, JourneyCategory::Rapid, 2, &[2, 8, 9]),
    (1444909400, JourneyCategory::Rapid, 3, &[0, 2, 8, 9]),
    (1444905000, JourneyCategory::Comfort, 1, &[0, 9]),
    (1444903680, JourneyCategory::Best, 2, &[0, 8, 9]),
    (1444903680, JourneyCategory::NonPtBike, 0, &[0]),
    (1444903500, JourneyCategory::NonPtWalk, -1, &[10]),
    // same legs as the best journey but arrives later
    (1444903800, JourneyCategory::Rapid, 2, &[0, 8, 9]),
    // same legs as the third journey but arrives later
    (1444905720, JourneyCategory::Rapid, 2, &[2, 3, 4, 10]),
];

/// A response with 19 journeys sharing 11 distinct segments, already
/// tagged by mode and direct path.
pub fn fixture_response() -> Response {
    let mut response = Response::new();
    for (arrival_timestamp, category, nb_transfers, section_idxs) in FIXTURE_JOURNEYS {
        let arrival = datetime_from_timestamp(arrival_timestamp);
        let departure = arrival - chrono::Duration::minutes(60);
        let mut journey = Journey::new(departure, arrival);
        journey.category = category;
        journey.nb_transfers = nb_transfers;
        journey.sections = section_idxs.iter().map(|idx| fixture_section(*idx)).collect();
        response.journeys.push(journey);
    }
    tagging::tag_by_mode(&mut response.journeys);
    tagging::tag_direct_paths(&mut response.journeys);
    response
}

/// The line ids (street modes included) of a journey, in section order.
pub fn journey_uris(journey: &Journey) -> Vec<String> {
    journey
        .sections
        .iter()
        .map(|section| match section.street_mode() {
            Some(mode) => mode.to_string(),
            None => section.line_id().unwrap_or_default().to_string(),
        })
        .collect()
}
