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

//! Culling of an over-full journey response down to the requested
//! number of journeys, while keeping the kept set as diverse as
//! possible.
//!
//! The pipeline tags journeys for deletion rather than removing them,
//! so that debug requests can still see every journey with its deletion
//! reason. Physical removal happens once, at the very end, for
//! non-debug requests.

pub mod candidates;
pub mod ranking;

use tracing::{debug, error, info};

use crate::config::CullingConfig;
use crate::request::JourneyRequest;
use crate::response::{
    Journey, JourneyCategory, Mode, Response, DELETED_BECAUSE_DUPLICATE_JOURNEY,
    DELETED_BECAUSE_NON_CAR_TAGGED_JOURNEY_FILTERED,
    DELETED_BECAUSE_SPECIAL_EVENT_JOURNEY_FILTERED, DELETED_BECAUSE_TOO_MUCH_CONNECTIONS,
    DELETED_BECAUSE_TOO_MUCH_JOURNEYS, TAG_SPECIAL_EVENT,
};

use candidates::{aggregate_journeys, build_candidate_pool};
use ranking::{rank, Selection};

pub fn cull_journeys(response: &mut Response, request: &JourneyRequest, config: &CullingConfig) {
    apply_final_filters(&mut response.journeys, request, config);
    apply_connection_filter(&mut response.journeys, request, config);
    // the count culling must never touch an exempted journey that
    // survived the filters
    let must_keep_before: Vec<usize> = response
        .journeys
        .iter()
        .enumerate()
        .filter(|(_, journey)| !journey.is_to_delete() && journey.category.is_must_keep())
        .map(|(idx, _)| idx)
        .collect();
    apply_count_culling(&mut response.journeys, request, config);
    for idx in must_keep_before {
        if response.journeys[idx].is_to_delete() {
            error!(
                "Journey {} in category {:?} was dropped by the culling",
                idx, response.journeys[idx].category
            );
            debug_assert!(false, "a journey exempt from culling was dropped");
        }
    }

    if !request.debug {
        response.journeys.retain(|journey| !journey.is_to_delete());
    }
    if let Some(max_nb_journeys) = request.max_nb_journeys {
        let nb_alive = alive_indices(&response.journeys).len();
        let nb_must_keep = response
            .journeys
            .iter()
            .filter(|journey| !journey.is_to_delete() && journey.category.is_must_keep())
            .count();
        // the cap may only be exceeded when the must-keep journeys alone
        // exceed it
        if nb_alive > max_nb_journeys && nb_alive > nb_must_keep {
            error!(
                "Culling left {} journeys for a requested maximum of {}",
                nb_alive, max_nb_journeys
            );
            debug_assert!(false, "culling left more journeys than requested");
        }
    }
}

fn alive_indices(journeys: &[Journey]) -> Vec<usize> {
    journeys
        .iter()
        .enumerate()
        .filter(|(_, journey)| !journey.is_to_delete())
        .map(|(idx, _)| idx)
        .collect()
}

/// Filters independent of the journey count : the non-car filter when the
/// request is car-only at the origin, and the special event exclusion.
fn apply_final_filters(journeys: &mut [Journey], request: &JourneyRequest, config: &CullingConfig) {
    if request.origin_modes == [Mode::Car] {
        for journey in journeys.iter_mut() {
            if !journey.has_tag("car") {
                journey.mark_for_deletion(DELETED_BECAUSE_NON_CAR_TAGGED_JOURNEY_FILTERED);
            }
        }
    }
    if config.special_event_excluded {
        for journey in journeys.iter_mut() {
            if journey.has_tag(TAG_SPECIAL_EVENT) {
                journey.mark_for_deletion(DELETED_BECAUSE_SPECIAL_EVENT_JOURNEY_FILTERED);
            }
        }
    }
}

/// Tags journeys with too many connections compared to the reference
/// journey. The reference is the `Best` public transport journey when
/// there is one, the earliest-arrival public transport journey
/// otherwise, and is always exempt.
fn apply_connection_filter(
    journeys: &mut [Journey],
    request: &JourneyRequest,
    config: &CullingConfig,
) {
    let reference_idx = match reference_journey_idx(journeys) {
        Some(idx) => idx,
        None => return,
    };
    let max_additional = request
        .max_additional_connections
        .unwrap_or(config.max_additional_connections);
    // i64 so that a huge allowance cannot wrap the sum around
    let allowed = i64::from(journeys[reference_idx].nb_transfers) + i64::from(max_additional);
    debug!(
        "Connection filter : reference journey has {} transfers, allowing up to {}",
        journeys[reference_idx].nb_transfers, allowed
    );
    for (idx, journey) in journeys.iter_mut().enumerate() {
        if idx == reference_idx || journey.is_to_delete() {
            continue;
        }
        if i64::from(journey.nb_transfers) > allowed {
            journey.mark_for_deletion(DELETED_BECAUSE_TOO_MUCH_CONNECTIONS);
        }
    }
}

fn reference_journey_idx(journeys: &[Journey]) -> Option<usize> {
    let candidates = journeys
        .iter()
        .enumerate()
        .filter(|(_, journey)| !journey.is_to_delete() && journey.has_public_transport());
    let mut best = None;
    let mut earliest: Option<usize> = None;
    for (idx, journey) in candidates {
        if journey.category == JourneyCategory::Best && best.is_none() {
            best = Some(idx);
        }
        earliest = match earliest {
            Some(current) if journeys[current].arrival <= journey.arrival => Some(current),
            _ => Some(idx),
        };
    }
    best.or(earliest)
}

/// When more journeys survive the filters than requested, picks the
/// most diverse subset through the candidate matrix and the ranker,
/// and tags the others.
fn apply_count_culling(journeys: &mut [Journey], request: &JourneyRequest, config: &CullingConfig) {
    let max_nb_journeys = match request.max_nb_journeys {
        Some(max) => max,
        None => return,
    };
    let alive = alive_indices(journeys);
    if alive.len() <= max_nb_journeys {
        return;
    }
    info!(
        "Too many journeys : {} for a requested maximum of {}",
        alive.len(),
        max_nb_journeys
    );

    // identical journeys never both survive, cull duplicates first
    let alive_journeys: Vec<Journey> = alive.iter().map(|idx| journeys[*idx].clone()).collect();
    let (kept, duplicates) = aggregate_journeys(&alive_journeys);
    for position in duplicates {
        journeys[alive[position]].mark_for_deletion(DELETED_BECAUSE_DUPLICATE_JOURNEY);
    }
    if kept.len() <= max_nb_journeys {
        return;
    }

    let pool = build_candidate_pool(kept.iter().map(|position| &alive_journeys[*position]));
    let selections = rank(&pool, max_nb_journeys, config);
    let best = match pick_best_selection(&selections, request, |row| &alive_journeys[kept[row]]) {
        Some(selection) => selection,
        None => {
            error!("The ranker returned no selection for a non-empty pool");
            debug_assert!(false, "ranker returned no selection");
            return;
        }
    };

    for (row, position) in kept.iter().enumerate() {
        if !best.rows.contains(&row) {
            journeys[alive[*position]].mark_for_deletion(DELETED_BECAUSE_TOO_MUCH_JOURNEYS);
        }
    }
}

/// The ranker sorts by coverage and redundancy only. Among the
/// equally-ranked best selections, prefer the one whose journeys stay
/// closest to the requested datetime : minimal worst deviation, then
/// minimal total deviation, then lexicographic row order.
fn pick_best_selection<'a, JourneyOfRow>(
    selections: &'a [Selection],
    request: &JourneyRequest,
    journey_of_row: JourneyOfRow,
) -> Option<&'a Selection>
where
    JourneyOfRow: Fn(usize) -> &'a Journey,
{
    let front = selections.first()?;
    let deviation = |selection: &Selection| -> (i64, i64) {
        let mut worst = 0i64;
        let mut total = 0i64;
        for row in &selection.rows {
            let journey = journey_of_row(*row);
            let gap = journey
                .arrival
                .signed_duration_since(request.datetime)
                .num_seconds()
                .abs();
            worst = worst.max(gap);
            total += gap;
        }
        (worst, total)
    };
    selections
        .iter()
        .take_while(|selection| {
            selection.coverage == front.coverage && selection.row_sum == front.row_sum
        })
        .min_by(|lhs, rhs| {
            deviation(lhs)
                .cmp(&deviation(rhs))
                .then_with(|| lhs.rows.cmp(&rhs.rows))
        })
}
