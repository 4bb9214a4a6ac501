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

mod utils;

use std::collections::BTreeSet;

use fenrir::config::CullingConfig;
use fenrir::culling::candidates::{aggregate_journeys, build_candidate_pool};
use fenrir::culling::cull_journeys;
use fenrir::culling::ranking::rank;
use fenrir::request::JourneyRequest;
use fenrir::response::{
    JourneyCategory, Mode, SegmentSignature, DELETED_BECAUSE_NON_CAR_TAGGED_JOURNEY_FILTERED,
    DELETED_BECAUSE_SPECIAL_EVENT_JOURNEY_FILTERED, DELETED_BECAUSE_TOO_MUCH_CONNECTIONS,
    TAG_SPECIAL_EVENT,
};

use utils::{datetime_from_timestamp, fixture_response, journey_uris};

fn fixture_request() -> JourneyRequest {
    // 10/15/2015 @ 12:00pm (UTC), a little before the first arrival
    JourneyRequest::new(datetime_from_timestamp(1444903200))
}

#[test]
fn candidate_pool_of_the_fixture() {
    let _log = utils::init_logger();
    let response = fixture_response();
    let pool = build_candidate_pool(&response.journeys);

    assert_eq!(pool.nb_journeys(), 19);
    assert_eq!(pool.nb_signatures(), 11);
    // 4 journeys carry a category exempting them from culling
    assert_eq!(pool.must_keep, BTreeSet::from([13, 14, 15, 16]));

    // columns are in first-seen order
    assert_eq!(
        pool.signatures[0..5],
        [
            SegmentSignature::Line("uri_1".to_string()),
            SegmentSignature::Line("uri_2".to_string()),
            SegmentSignature::Line("uri_3".to_string()),
            SegmentSignature::Line("uri_4".to_string()),
            SegmentSignature::Street(Mode::Walking),
        ]
    );
    // first journey : lines 1 to 4 and a walking leg
    assert_eq!(
        pool.rows[0],
        vec![true, true, true, true, true, false, false, false, false, false, false]
    );
    // thirteenth journey : bike, line 2, lines 8 and 9
    assert_eq!(
        pool.rows[12],
        vec![false, true, false, false, false, false, false, true, false, true, true]
    );
}

#[test]
fn ranking_the_fixture_for_nine_journeys() {
    let _log = utils::init_logger();
    let response = fixture_response();
    let pool = build_candidate_pool(&response.journeys);

    // 4 journeys are must-keep, we'd like to select another 5
    let selections = rank(&pool, 9, &CullingConfig::default());

    let front = &selections[0];
    assert_eq!(front.coverage, 11);
    assert_eq!(front.row_sum, 25);
    let nb_tied = selections
        .iter()
        .take_while(|selection| {
            selection.coverage == front.coverage && selection.row_sum == front.row_sum
        })
        .count();
    assert_eq!(nb_tied, 33);
    assert_eq!(front.rows, vec![0, 3, 7, 8, 11, 13, 14, 15, 16]);
}

#[test]
fn aggregation_of_the_fixture() {
    let response = fixture_response();
    let (kept, remaining) = aggregate_journeys(&response.journeys);
    assert_eq!(kept.len(), 17);
    // the two late copies of earlier journeys lose
    assert_eq!(remaining, vec![17, 18]);
}

#[test]
fn a_best_journey_arriving_after_its_twin_survives_the_culling() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    // journeys 14 and 17 ride the same legs; make the ordinary twin the
    // earlier one, so that the duplicate aggregation is tempted to keep
    // it over the best journey
    let twin_arrival = response.journeys[17].arrival;
    response.journeys[17].arrival = response.journeys[14].arrival;
    response.journeys[14].arrival = twin_arrival;
    assert!(response.journeys[14].category == JourneyCategory::Best);
    assert!(response.journeys[17].arrival < response.journeys[14].arrival);

    let mut request = fixture_request();
    request.max_nb_journeys = Some(6);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    assert_eq!(response.journeys.len(), 6);
    assert!(response
        .journeys
        .iter()
        .any(|journey| journey.category == JourneyCategory::Best));
}

#[test]
fn a_huge_connection_allowance_does_not_wrap_around() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.debug = true;
    request.max_additional_connections = Some(u32::MAX);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    assert!(!response
        .journeys
        .iter()
        .any(|journey| journey.has_tag(DELETED_BECAUSE_TOO_MUCH_CONNECTIONS)));
}

#[test]
fn no_culling_when_max_is_large_enough() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.max_nb_journeys = Some(response.journeys.len() + 1);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    assert_eq!(response.journeys.len(), 19);
}

#[test]
fn max_below_must_keep_count_keeps_every_must_keep_journey() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.max_nb_journeys = Some(2);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    // the cap is soft : exempted journeys are never traded against it
    assert_eq!(response.journeys.len(), 4);
    assert!(response
        .journeys
        .iter()
        .all(|journey| journey.category.is_must_keep()));
}

#[test]
fn max_equal_to_must_keep_count() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.max_nb_journeys = Some(4);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    assert_eq!(response.journeys.len(), 4);
    assert!(response
        .journeys
        .iter()
        .all(|journey| journey.category.is_must_keep()));
}

#[test]
fn culling_to_six_journeys() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.max_nb_journeys = Some(6);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    assert_eq!(response.journeys.len(), 6);

    let expected: BTreeSet<(Vec<String>, i64)> = BTreeSet::from([
        (
            vec!["uri_1", "uri_2", "uri_5", "uri_6", "walking"],
            1444905300,
        ),
        (vec!["uri_2", "uri_3", "uri_4", "walking"], 1444905600),
        (vec!["bike", "uri_9"], 1444905000),
        (vec!["bike", "uri_8", "uri_9"], 1444903680),
        (vec!["bike"], 1444903680),
        (vec!["walking"], 1444903500),
    ])
    .into_iter()
    .map(|(uris, arrival)| {
        (
            uris.into_iter().map(str::to_string).collect(),
            arrival,
        )
    })
    .collect();
    let got: BTreeSet<(Vec<String>, i64)> = response
        .journeys
        .iter()
        .map(|journey| {
            (
                journey_uris(journey),
                journey.arrival.and_utc().timestamp(),
            )
        })
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn connection_filter_follows_the_best_journey() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.debug = true;
    request.max_additional_connections = Some(0);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    // the best journey has 2 transfers; only the two 3-transfer journeys fall
    let tagged: Vec<usize> = response
        .journeys
        .iter()
        .enumerate()
        .filter(|(_, journey)| journey.has_tag(DELETED_BECAUSE_TOO_MUCH_CONNECTIONS))
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(tagged, vec![4, 12]);

    let mut response = fixture_response();
    request.max_additional_connections = Some(1);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    assert!(!response
        .journeys
        .iter()
        .any(|journey| journey.has_tag(DELETED_BECAUSE_TOO_MUCH_CONNECTIONS)));
}

#[test]
fn car_only_requests_drop_journeys_without_car() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.debug = true;
    request.origin_modes = vec![Mode::Car];
    cull_journeys(&mut response, &request, &CullingConfig::default());
    // no fixture journey has a car leg
    assert!(response
        .journeys
        .iter()
        .all(|journey| journey.has_tag(DELETED_BECAUSE_NON_CAR_TAGGED_JOURNEY_FILTERED)));
}

#[test]
fn special_event_journeys_can_be_excluded() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    response.journeys[0].tag(TAG_SPECIAL_EVENT);
    let mut request = fixture_request();
    request.debug = true;
    let config = CullingConfig {
        special_event_excluded: true,
        ..CullingConfig::default()
    };
    cull_journeys(&mut response, &request, &config);
    assert!(response.journeys[0].has_tag(DELETED_BECAUSE_SPECIAL_EVENT_JOURNEY_FILTERED));
    assert!(response.journeys[0].is_to_delete());
    assert!(!response.journeys[1].is_to_delete());
}

#[test]
fn debug_requests_keep_tagged_journeys() {
    let _log = utils::init_logger();
    let mut response = fixture_response();
    let mut request = fixture_request();
    request.debug = true;
    request.max_nb_journeys = Some(6);
    cull_journeys(&mut response, &request, &CullingConfig::default());
    assert_eq!(response.journeys.len(), 19);
    let alive = response
        .journeys
        .iter()
        .filter(|journey| !journey.is_to_delete())
        .count();
    assert_eq!(alive, 6);
}
