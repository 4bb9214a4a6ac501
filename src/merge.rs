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

//! Merging of the partial responses coming back from the engine calls
//! into a single response.

use std::collections::BTreeSet;

use tracing::debug;

use crate::response::{ErrorId, Response, ResponseError};

/// Merges partial responses in call order. Journeys are concatenated;
/// an error is reported only when every partial response is journey-less.
/// Feed publishers are kept only when a surviving journey references them.
pub fn merge_responses(responses: Vec<Response>, debug_mode: bool) -> Response {
    let mut merged = Response::new();
    let mut error_messages: Vec<String> = Vec::new();
    for response in responses {
        if response.journeys.is_empty() {
            if let Some(error) = response.error {
                if !error_messages.contains(&error.message) {
                    error_messages.push(error.message);
                }
            }
            continue;
        }
        for feed_publisher in response.feed_publishers {
            if merged
                .feed_publishers
                .iter()
                .all(|existing| existing.id != feed_publisher.id)
            {
                merged.feed_publishers.push(feed_publisher);
            }
        }
        merged.journeys.extend(response.journeys);
    }

    if merged.journeys.is_empty() {
        debug!(
            "No journey in any partial response, reporting no_solution : {:?}",
            error_messages
        );
        let message = if error_messages.is_empty() {
            "no solution found for this journey".to_string()
        } else {
            error_messages.join("; ")
        };
        merged.error = Some(ResponseError {
            id: ErrorId::NoSolution,
            message,
        });
        merged.feed_publishers.clear();
        return merged;
    }

    let referenced: BTreeSet<&str> = merged
        .journeys
        .iter()
        .filter(|journey| debug_mode || !journey.is_to_delete())
        .flat_map(|journey| journey.feed_publishers.iter().map(String::as_str))
        .collect();
    let retained: Vec<crate::response::FeedPublisher> = merged
        .feed_publishers
        .drain(..)
        .filter(|feed_publisher| referenced.contains(feed_publisher.id.as_str()))
        .collect();
    merged.feed_publishers = retained;

    merged
}
