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

#![expect(missing_docs)]

use smallvec::SmallVec;

use crate::backend::CommitId;
use crate::backend::TreeId;

/// Position of an interned commit in the graph arena.
///
/// Positions are stable for the lifetime of the graph; two references to the
/// same commit always carry the same position, so position equality is
/// commit identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitPos(pub(crate) u32);

/// Marks a history boundary commit in presentation output.
pub const BOUNDARY: u32 = 1 << 5;
/// Marks a commit reachable only from the left side of a symmetric range.
pub const SYMMETRIC_LEFT: u32 = 1 << 6;

/// Flag bits free for traversal callers. The bits above these belong to the
/// merge-base engine.
pub const TRAVERSAL_FLAGS: u32 = 0xffff;

/// Parent positions, inline for the common one- and two-parent cases.
pub(crate) type ParentsVec = SmallVec<[CommitPos; 2]>;

/// A node of the commit DAG.
///
/// A node is created unparsed when its id is first seen; `parse_commit`
/// fills in the tree, parents and date exactly once. Flags are a scratch
/// bitset owned by whoever is traversing.
#[derive(Debug)]
pub struct CommitNode {
    pub(crate) id: CommitId,
    pub(crate) parsed: bool,
    pub(crate) tree: Option<TreeId>,
    pub(crate) parents: ParentsVec,
    pub(crate) date: u64,
    pub(crate) flags: u32,
    pub(crate) buffer: Option<Box<[u8]>>,
}

impl CommitNode {
    pub(crate) fn new(id: CommitId) -> Self {
        Self {
            id,
            parsed: false,
            tree: None,
            parents: ParentsVec::new(),
            date: 0,
            flags: 0,
            buffer: None,
        }
    }

    pub fn id(&self) -> &CommitId {
        &self.id
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn tree(&self) -> Option<&TreeId> {
        self.tree.as_ref()
    }

    /// Parents in the order of the `parent` headers (or of the graft entry
    /// when one applies). The first parent is distinguished.
    pub fn parents(&self) -> &[CommitPos] {
        &self.parents
    }

    /// Committer time in seconds since the epoch; 0 when unparseable.
    pub fn date(&self) -> u64 {
        self.date
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn has_flags(&self, mask: u32) -> bool {
        self.flags & mask != 0
    }

    /// The raw commit bytes, when buffer retention is enabled.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }
}

/// Work list of commits kept sorted by date, most recent first.
///
/// Cells are owned by whoever builds the list and are consumed by
/// [`CommitList::pop_front`]. Insertion is stable: a new cell goes after
/// existing cells with an equal date.
#[derive(Clone, Debug, Default)]
pub struct CommitList {
    cells: Vec<(CommitPos, u64)>,
}

impl CommitList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Prepends a cell, ignoring date order.
    pub fn push_front(&mut self, pos: CommitPos, date: u64) {
        self.cells.insert(0, (pos, date));
    }

    /// Appends a cell, ignoring date order.
    pub fn push_back(&mut self, pos: CommitPos, date: u64) {
        self.cells.push((pos, date));
    }

    /// Inserts before the first cell whose date is strictly less than
    /// `date`, so the head stays the most recent commit.
    pub fn insert_by_date(&mut self, pos: CommitPos, date: u64) {
        let at = self
            .cells
            .iter()
            .position(|&(_, d)| d < date)
            .unwrap_or(self.cells.len());
        self.cells.insert(at, (pos, date));
    }

    /// Detaches and returns the head commit.
    pub fn pop_front(&mut self) -> Option<CommitPos> {
        if self.cells.is_empty() {
            None
        } else {
            Some(self.cells.remove(0).0)
        }
    }

    /// Rebuilds the list in descending date order. Equal dates keep their
    /// current relative order.
    pub fn sort_by_date(&mut self) {
        self.cells.sort_by_key(|&(_, date)| std::cmp::Reverse(date));
    }

    pub fn iter(&self) -> impl Iterator<Item = CommitPos> + '_ {
        self.cells.iter().map(|&(pos, _)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(n: u32) -> CommitPos {
        CommitPos(n)
    }

    #[test]
    fn test_insert_by_date_orders_descending() {
        let mut list = CommitList::new();
        list.insert_by_date(pos(0), 100);
        list.insert_by_date(pos(1), 300);
        list.insert_by_date(pos(2), 200);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![pos(1), pos(2), pos(0)]);
    }

    #[test]
    fn test_insert_by_date_is_stable_for_ties() {
        let mut list = CommitList::new();
        list.insert_by_date(pos(0), 100);
        list.insert_by_date(pos(1), 100);
        list.insert_by_date(pos(2), 100);
        // Later cells with an equal date land after earlier ones.
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![pos(0), pos(1), pos(2)]);
    }

    #[test]
    fn test_pop_front_consumes_head() {
        let mut list = CommitList::new();
        list.insert_by_date(pos(0), 1);
        list.insert_by_date(pos(1), 2);
        assert_eq!(list.pop_front(), Some(pos(1)));
        assert_eq!(list.pop_front(), Some(pos(0)));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_sort_by_date() {
        let mut list = CommitList::new();
        list.push_back(pos(0), 10);
        list.push_back(pos(1), 30);
        list.push_back(pos(2), 20);
        list.push_back(pos(3), 30);
        list.sort_by_date();
        assert_eq!(
            list.iter().collect::<Vec<_>>(),
            vec![pos(1), pos(3), pos(2), pos(0)]
        );
    }
}
