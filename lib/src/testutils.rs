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

//! In-memory fixtures for commit-graph tests.

use std::collections::HashMap;

use crate::backend::Backend;
use crate::backend::BackendError;
use crate::backend::BackendResult;
use crate::backend::CommitId;
use crate::backend::ObjectKind;
use crate::backend::TreeId;
use crate::object_id::ObjectId as _;

/// A 20-byte commit id filled with `n`.
pub(crate) fn commit_id(n: u8) -> CommitId {
    CommitId::new(vec![n; 20])
}

/// The tree id [`TestBackend::add_commit`] derives for the commit id with
/// the same fill byte.
pub(crate) fn tree_id(n: u8) -> TreeId {
    TreeId::new(vec![n; 20])
}

/// Builds a raw commit buffer in the textual object format.
pub(crate) fn commit_buffer(
    tree: &TreeId,
    parents: &[CommitId],
    author: &str,
    committer: &str,
    message: &str,
) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(format!("tree {}\n", tree.hex()).as_bytes());
    for parent in parents {
        buffer.extend_from_slice(format!("parent {}\n", parent.hex()).as_bytes());
    }
    buffer.extend_from_slice(format!("author {author}\n").as_bytes());
    buffer.extend_from_slice(format!("committer {committer}\n").as_bytes());
    buffer.push(b'\n');
    buffer.extend_from_slice(message.as_bytes());
    buffer
}

/// An object store held in a map, with helpers for building well-formed
/// commits.
#[derive(Debug, Default)]
pub(crate) struct TestBackend {
    objects: HashMap<CommitId, (ObjectKind, Vec<u8>)>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw object bytes under `id`.
    pub fn add_object(&mut self, id: CommitId, kind: ObjectKind, bytes: Vec<u8>) {
        self.objects.insert(id, (kind, bytes));
    }

    /// Stores a commit with stock idents, a tree derived from the commit
    /// id, and the given committer date.
    pub fn add_commit(&mut self, id: CommitId, parents: &[CommitId], date: u64) {
        let tree = TreeId::new(id.to_bytes());
        let buffer = commit_buffer(
            &tree,
            parents,
            &format!("A U Thor <author@example.com> {date} +0000"),
            &format!("C O Mitter <committer@example.com> {date} +0000"),
            &format!("commit {}\n", id.hex()),
        );
        self.add_object(id, ObjectKind::Commit, buffer);
    }

    /// Stores an annotated tag pointing at `target`.
    pub fn add_tag(&mut self, id: CommitId, target: CommitId, name: &str) {
        let target_kind = self
            .objects
            .get(&target)
            .map_or(ObjectKind::Commit, |(kind, _)| *kind);
        let buffer = format!(
            "object {}\ntype {}\ntag {name}\ntagger T Agger <tagger@example.com> 100 +0000\n\n{name}\n",
            target.hex(),
            target_kind.name(),
        );
        self.add_object(id, ObjectKind::Tag, buffer.into_bytes());
    }
}

impl Backend for TestBackend {
    fn hash_length(&self) -> usize {
        20
    }

    fn read_object(&self, id: &CommitId) -> BackendResult<(ObjectKind, Vec<u8>)> {
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::ObjectNotFound { hash: id.hex() })
    }
}
