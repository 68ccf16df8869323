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

//! Chronological and topological history traversal.

use std::collections::HashMap;

use crate::commit::CommitList;
use crate::commit::CommitPos;
use crate::graph::CommitGraph;
use crate::graph::GraphResult;

/// Pops the most recent commit off `frontier` and extends the frontier
/// through its parents.
///
/// Parents are parsed on demand; each parent that does not yet carry `mark`
/// is marked and date-inserted into the frontier. Driving a frontier to
/// exhaustion emits every reachable commit exactly once per mark, in
/// non-increasing date order with ties broken by insertion order.
pub fn pop_most_recent(
    graph: &mut CommitGraph,
    frontier: &mut CommitList,
    mark: u32,
) -> GraphResult<Option<CommitPos>> {
    let Some(pos) = frontier.pop_front() else {
        return Ok(None);
    };
    let parents: Vec<CommitPos> = graph[pos].parents().to_vec();
    for parent in parents {
        graph.parse_commit(parent)?;
        if !graph[parent].has_flags(mark) {
            let date = graph[parent].date();
            graph.add_flags(parent, mark);
            frontier.insert_by_date(parent, date);
        }
    }
    Ok(Some(pos))
}

/// Reorders `commits` in place so that every commit precedes all of its
/// ancestors in the list.
///
/// With `lifo` false, ties between topologically-equal commits are broken by
/// descending date; with `lifo` true, by the order in which their indegree
/// reached zero. The commits must already be parsed; edges to commits
/// outside the list are ignored.
pub fn sort_in_topological_order(graph: &CommitGraph, commits: &mut Vec<CommitPos>, lifo: bool) {
    if commits.is_empty() {
        return;
    }
    // Indegree within the list: the number of listed children of each
    // listed commit.
    let mut indegree: HashMap<CommitPos, u32> =
        commits.iter().map(|&commit| (commit, 0)).collect();
    for &commit in &*commits {
        for &parent in graph[commit].parents() {
            if let Some(count) = indegree.get_mut(&parent) {
                *count += 1;
            }
        }
    }

    // Tips first: commits no other list member depends on.
    let mut work = CommitList::new();
    for &commit in &*commits {
        if indegree[&commit] == 0 {
            work.push_back(commit, graph[commit].date());
        }
    }
    if !lifo {
        work.sort_by_date();
    }

    let mut output = Vec::with_capacity(commits.len());
    while let Some(commit) = work.pop_front() {
        for &parent in graph[commit].parents() {
            let Some(count) = indegree.get_mut(&parent) else {
                continue;
            };
            *count -= 1;
            if *count == 0 {
                let date = graph[parent].date();
                if lifo {
                    work.push_front(parent, date);
                } else {
                    work.insert_by_date(parent, date);
                }
            }
        }
        output.push(commit);
    }
    *commits = output;
}
