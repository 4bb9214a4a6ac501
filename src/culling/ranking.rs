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

use std::cmp::Reverse;
use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::warn;

use crate::config::CullingConfig;

use super::candidates::CandidatePool;

/// A candidate set of journeys to keep. `rows` always contains every
/// must-keep row, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub rows: Vec<usize>,
    /// Number of distinct segment signatures covered by the selected rows.
    pub coverage: usize,
    /// Total number of matrix cells set in the selected rows. At equal
    /// coverage, a lower row sum means less redundancy.
    pub row_sum: usize,
}

fn evaluate(pool: &CandidatePool, rows: Vec<usize>) -> Selection {
    let mut covered = vec![false; pool.nb_signatures()];
    let mut row_sum = 0;
    for row_idx in &rows {
        for (column, is_set) in pool.rows[*row_idx].iter().enumerate() {
            if *is_set {
                covered[column] = true;
                row_sum += 1;
            }
        }
    }
    let coverage = covered.iter().filter(|is_covered| **is_covered).count();
    Selection {
        rows,
        coverage,
        row_sum,
    }
}

/// Ranks the ways of keeping `target_count` journeys out of the pool.
/// Selections are sorted by coverage (descending), then row sum
/// (ascending), then row indices (lexicographic). Every selection
/// contains all must-keep rows.
///
/// When the free pool is larger than `config.max_exhaustive_pool`,
/// exhaustive enumeration is abandoned for a greedy pick and a single
/// selection is returned.
pub fn rank(pool: &CandidatePool, target_count: usize, config: &CullingConfig) -> Vec<Selection> {
    let must_keep: Vec<usize> = pool.must_keep.iter().copied().collect();
    if target_count <= must_keep.len() {
        return vec![evaluate(pool, must_keep)];
    }
    let free_rows: Vec<usize> = (0..pool.nb_journeys())
        .filter(|row_idx| !pool.must_keep.contains(row_idx))
        .collect();
    let nb_free_picks = target_count - must_keep.len();
    if nb_free_picks >= free_rows.len() {
        let mut rows = must_keep;
        rows.extend(&free_rows);
        rows.sort_unstable();
        return vec![evaluate(pool, rows)];
    }

    if free_rows.len() > config.max_exhaustive_pool {
        warn!(
            "Too many culling candidates ({} > {}), falling back to greedy selection",
            free_rows.len(),
            config.max_exhaustive_pool
        );
        return vec![greedy(pool, &free_rows, nb_free_picks)];
    }

    let mut selections: Vec<Selection> = free_rows
        .iter()
        .copied()
        .combinations(nb_free_picks)
        .map(|picked| {
            let mut rows = must_keep.clone();
            rows.extend(picked);
            rows.sort_unstable();
            evaluate(pool, rows)
        })
        .collect();
    selections.sort_by(|lhs, rhs| {
        (Reverse(lhs.coverage), lhs.row_sum, &lhs.rows)
            .cmp(&(Reverse(rhs.coverage), rhs.row_sum, &rhs.rows))
    });
    selections
}

/// Picks free rows one by one : most newly covered columns first, then
/// smallest row sum, then smallest index.
fn greedy(pool: &CandidatePool, free_rows: &[usize], nb_free_picks: usize) -> Selection {
    let mut covered: BTreeSet<usize> = pool
        .must_keep
        .iter()
        .flat_map(|row_idx| {
            pool.rows[*row_idx]
                .iter()
                .enumerate()
                .filter(|(_, is_set)| **is_set)
                .map(|(column, _)| column)
        })
        .collect();
    let mut picked: Vec<usize> = Vec::with_capacity(nb_free_picks);
    let row_popcount = |row_idx: usize| pool.rows[row_idx].iter().filter(|set| **set).count();

    while picked.len() < nb_free_picks {
        let best = free_rows
            .iter()
            .copied()
            .filter(|row_idx| !picked.contains(row_idx))
            .min_by_key(|row_idx| {
                let newly_covered = pool.rows[*row_idx]
                    .iter()
                    .enumerate()
                    .filter(|(column, is_set)| **is_set && !covered.contains(column))
                    .count();
                (Reverse(newly_covered), row_popcount(*row_idx), *row_idx)
            });
        match best {
            Some(row_idx) => {
                for (column, is_set) in pool.rows[row_idx].iter().enumerate() {
                    if *is_set {
                        covered.insert(column);
                    }
                }
                picked.push(row_idx);
            }
            None => break,
        }
    }

    let mut rows: Vec<usize> = pool.must_keep.iter().copied().collect();
    rows.extend(picked);
    rows.sort_unstable();
    evaluate(pool, rows)
}
