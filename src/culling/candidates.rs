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

use std::collections::{BTreeMap, BTreeSet};

use crate::response::{Journey, SegmentSignature};

/// Binary journey/segment matrix fed to the ranker. One row per journey,
/// one column per distinct segment signature, columns in first-seen order.
#[derive(Debug)]
pub struct CandidatePool {
    pub signatures: Vec<SegmentSignature>,
    pub rows: Vec<Vec<bool>>,
    /// Rows whose journey category exempts it from culling.
    pub must_keep: BTreeSet<usize>,
}

impl CandidatePool {
    pub fn nb_journeys(&self) -> usize {
        self.rows.len()
    }

    pub fn nb_signatures(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn build_candidate_pool<'a, Journeys>(journeys: Journeys) -> CandidatePool
where
    Journeys: IntoIterator<Item = &'a Journey>,
{
    let journeys: Vec<&Journey> = journeys.into_iter().collect();

    let mut signatures: Vec<SegmentSignature> = Vec::new();
    let mut signature_columns: BTreeMap<SegmentSignature, usize> = BTreeMap::new();
    for journey in &journeys {
        for signature in journey.signatures() {
            if !signature_columns.contains_key(&signature) {
                signature_columns.insert(signature.clone(), signatures.len());
                signatures.push(signature);
            }
        }
    }

    let mut rows = Vec::with_capacity(journeys.len());
    let mut must_keep = BTreeSet::new();
    for (row_idx, journey) in journeys.iter().enumerate() {
        let mut row = vec![false; signatures.len()];
        for signature in journey.signatures() {
            if let Some(column) = signature_columns.get(&signature) {
                row[*column] = true;
            }
        }
        rows.push(row);
        if journey.category.is_must_keep() {
            must_keep.insert(row_idx);
        }
    }

    CandidatePool {
        signatures,
        rows,
        must_keep,
    }
}

/// Deduplicates journeys using the exact same segment signature set,
/// keeping the earliest arrival (input order on ties). A journey whose
/// category exempts it from culling never loses its duplicate group :
/// it takes the place of an ordinary incumbent, and two exempted
/// duplicates are both kept. Returns the indices of the deduplicated
/// journeys and the indices of the duplicates that lost.
pub fn aggregate_journeys(journeys: &[Journey]) -> (Vec<usize>, Vec<usize>) {
    let mut kept: Vec<usize> = Vec::new();
    let mut kept_positions: BTreeMap<BTreeSet<SegmentSignature>, usize> = BTreeMap::new();
    let mut remaining: Vec<usize> = Vec::new();

    for (idx, journey) in journeys.iter().enumerate() {
        let signatures = journey.signatures();
        let position = match kept_positions.get(&signatures) {
            None => {
                kept_positions.insert(signatures, kept.len());
                kept.push(idx);
                continue;
            }
            Some(position) => *position,
        };
        let incumbent = kept[position];
        let incumbent_exempt = journeys[incumbent].category.is_must_keep();
        if journey.category.is_must_keep() {
            if incumbent_exempt {
                kept.push(idx);
            } else {
                kept[position] = idx;
                remaining.push(incumbent);
            }
        } else if !incumbent_exempt && journey.arrival < journeys[incumbent].arrival {
            kept[position] = idx;
            remaining.push(incumbent);
        } else {
            remaining.push(idx);
        }
    }

    (kept, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{JourneyCategory, Mode, Section};
    use chrono::NaiveDate;

    fn journey(arrival_minute: u32, sections: Vec<Section>) -> Journey {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let mut journey = Journey::new(
            date.and_hms_opt(8, 0, 0).unwrap(),
            date.and_hms_opt(9, arrival_minute, 0).unwrap(),
        );
        journey.sections = sections;
        journey
    }

    #[test]
    fn columns_in_first_seen_order() {
        let journeys = vec![
            journey(
                0,
                vec![
                    Section::street_network(Mode::Walking),
                    Section::public_transport("line:A"),
                ],
            ),
            journey(
                1,
                vec![
                    Section::public_transport("line:B"),
                    Section::public_transport("line:A"),
                ],
            ),
        ];
        let pool = build_candidate_pool(&journeys);
        assert_eq!(
            pool.signatures,
            vec![
                SegmentSignature::Line("line:A".to_string()),
                SegmentSignature::Street(Mode::Walking),
                SegmentSignature::Line("line:B".to_string()),
            ]
        );
        assert_eq!(
            pool.rows,
            vec![vec![true, true, false], vec![true, false, true]]
        );
    }

    #[test]
    fn must_keep_follows_categories() {
        let mut journeys = vec![
            journey(0, vec![Section::public_transport("line:A")]),
            journey(1, vec![Section::public_transport("line:B")]),
        ];
        journeys[1].category = JourneyCategory::Best;
        let pool = build_candidate_pool(&journeys);
        assert_eq!(pool.must_keep, BTreeSet::from([1]));
    }

    #[test]
    fn aggregate_keeps_earliest_arrival() {
        let journeys = vec![
            journey(10, vec![Section::public_transport("line:A")]),
            journey(5, vec![Section::public_transport("line:A")]),
            journey(7, vec![Section::public_transport("line:B")]),
        ];
        let (kept, remaining) = aggregate_journeys(&journeys);
        // the later duplicate with the earlier arrival took the first
        // occurrence's position
        assert_eq!(kept, vec![1, 2]);
        assert_eq!(remaining, vec![0]);
    }

    #[test]
    fn aggregate_never_drops_an_exempt_category() {
        let mut journeys = vec![
            journey(5, vec![Section::public_transport("line:A")]),
            journey(10, vec![Section::public_transport("line:A")]),
        ];
        journeys[1].category = JourneyCategory::Best;
        // the best journey wins its group despite the later arrival
        let (kept, remaining) = aggregate_journeys(&journeys);
        assert_eq!(kept, vec![1]);
        assert_eq!(remaining, vec![0]);
    }

    #[test]
    fn two_exempt_duplicates_are_both_kept() {
        let mut journeys = vec![
            journey(5, vec![Section::public_transport("line:A")]),
            journey(10, vec![Section::public_transport("line:A")]),
            journey(12, vec![Section::public_transport("line:A")]),
        ];
        journeys[0].category = JourneyCategory::Comfort;
        journeys[1].category = JourneyCategory::Best;
        let (kept, remaining) = aggregate_journeys(&journeys);
        assert_eq!(kept, vec![0, 1]);
        assert_eq!(remaining, vec![2]);
    }

    #[test]
    fn aggregate_keeps_first_on_ties() {
        let journeys = vec![
            journey(5, vec![Section::public_transport("line:A")]),
            journey(5, vec![Section::public_transport("line:A")]),
        ];
        let (kept, remaining) = aggregate_journeys(&journeys);
        assert_eq!(kept, vec![0]);
        assert_eq!(remaining, vec![1]);
    }
}
