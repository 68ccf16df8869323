// Copyright 2026 The Relic Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Best-common-ancestor computation over the commit DAG.
//!
//! The engine paints reachability into the high flag bits of the nodes it
//! visits: a commit carrying both [`PARENT1`] and [`PARENT2`] is a common
//! ancestor, and [`STALE`] spreads from found ancestors downwards so that
//! dominated candidates drop out. Callers either clear the bits themselves
//! with [`CommitGraph::clear_marks`] or go through [`get_merge_bases`].

use itertools::Itertools as _;

use crate::commit::CommitList;
use crate::commit::CommitPos;
use crate::graph::CommitGraph;
use crate::graph::GraphError;
use crate::graph::GraphResult;

/// Commit reachable from the first argument of the query.
pub const PARENT1: u32 = 1 << 16;
/// Commit reachable from the second argument of the query.
pub const PARENT2: u32 = 1 << 17;
/// Commit dominated by an already-found common ancestor.
pub const STALE: u32 = 1 << 18;
/// Commit already emitted as a common ancestor.
pub const RESULT: u32 = 1 << 19;

/// Every bit the merge-base engine may set.
pub const ALL_FLAGS: u32 = PARENT1 | PARENT2 | STALE | RESULT;

fn interesting(graph: &CommitGraph, frontier: &CommitList) -> bool {
    frontier.iter().any(|pos| !graph[pos].has_flags(STALE))
}

/// Returns the common ancestors of `a` and `b` that have not been dominated
/// by a more recent one, most recent first.
///
/// Leaves the engine's flag bits set on the traversed subgraph; callers
/// clear them through [`CommitGraph::clear_marks`] on both arguments, or use
/// [`get_merge_bases`]. Querying a commit against itself returns the commit
/// with no flags touched.
pub fn merge_bases(
    graph: &mut CommitGraph,
    a: CommitPos,
    b: CommitPos,
) -> GraphResult<Vec<CommitPos>> {
    if a == b {
        return Ok(vec![a]);
    }
    graph.parse_commit(a)?;
    graph.parse_commit(b)?;

    let mut frontier = CommitList::new();
    graph.add_flags(a, PARENT1);
    frontier.insert_by_date(a, graph[a].date());
    graph.add_flags(b, PARENT2);
    frontier.insert_by_date(b, graph[b].date());

    let mut results = CommitList::new();
    while interesting(graph, &frontier) {
        let Some(pos) = frontier.pop_front() else {
            break;
        };
        let mut flags = graph[pos].flags() & (PARENT1 | PARENT2 | STALE);
        if flags == (PARENT1 | PARENT2) {
            if !graph[pos].has_flags(RESULT) {
                graph.add_flags(pos, RESULT);
                results.insert_by_date(pos, graph[pos].date());
            }
            // Ancestors of a common ancestor are dominated.
            flags |= STALE;
        }
        let parents: Vec<CommitPos> = graph[pos].parents().to_vec();
        for parent in parents {
            if graph[parent].flags() & flags == flags {
                continue;
            }
            graph.parse_commit(parent)?;
            graph.add_flags(parent, flags);
            frontier.insert_by_date(parent, graph[parent].date());
        }
    }

    Ok(results
        .iter()
        .filter(|&pos| !graph[pos].has_flags(STALE))
        .collect())
}

/// Returns the independent merge bases of `a` and `b`: common ancestors
/// that are not ancestors of one another, most recent first.
///
/// With `cleanup` set, all engine flag bits are cleared before returning.
/// When several candidates come back, the bits are cleared regardless,
/// since the pairwise reduction needs a clean slate.
pub fn get_merge_bases(
    graph: &mut CommitGraph,
    a: CommitPos,
    b: CommitPos,
    cleanup: bool,
) -> GraphResult<Vec<CommitPos>> {
    let bases = merge_bases(graph, a, b)?;
    if bases.len() <= 1 {
        if cleanup {
            graph.clear_marks(a, ALL_FLAGS);
            graph.clear_marks(b, ALL_FLAGS);
        }
        return Ok(bases);
    }

    // More than one: weed out candidates that are ancestors of another.
    graph.clear_marks(a, ALL_FLAGS);
    graph.clear_marks(b, ALL_FLAGS);
    let mut candidates: Vec<Option<CommitPos>> = bases.into_iter().map(Some).collect();
    for (i, j) in (0..candidates.len()).tuple_combinations() {
        let (Some(first), Some(second)) = (candidates[i], candidates[j]) else {
            continue;
        };
        let common = merge_bases(graph, first, second)?;
        graph.clear_marks(first, ALL_FLAGS);
        graph.clear_marks(second, ALL_FLAGS);
        for base in common {
            if candidates[i] == Some(base) {
                candidates[i] = None;
            }
            if candidates[j] == Some(base) {
                candidates[j] = None;
            }
        }
    }

    let mut result = CommitList::new();
    for pos in candidates.into_iter().flatten() {
        result.insert_by_date(pos, graph[pos].date());
    }
    Ok(result.iter().collect())
}

/// Returns true when `commit` is itself a merge base of `commit` and the
/// reference, i.e. an ancestor of it. Only single-reference queries are
/// defined.
pub fn in_merge_bases(
    graph: &mut CommitGraph,
    commit: CommitPos,
    references: &[CommitPos],
) -> GraphResult<bool> {
    let [reference] = references else {
        return Err(GraphError::Unsupported(
            "merge-base queries against multiple references are not implemented".to_string(),
        ));
    };
    let bases = get_merge_bases(graph, commit, *reference, true)?;
    Ok(bases.contains(&commit))
}
