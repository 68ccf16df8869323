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

//! The interned commit DAG.
//!
//! [`CommitGraph`] owns an arena of [`CommitNode`]s and canonicalises commit
//! ids to arena positions, so every reference to the same commit is the same
//! [`CommitPos`]. Nodes are created unparsed on first lookup and filled in
//! by [`CommitGraph::parse_commit`] exactly once.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io;
use std::ops::Index;
use std::path::Path;

use bstr::ByteSlice as _;
use thiserror::Error;

use crate::backend::Backend;
use crate::backend::BackendError;
use crate::backend::CommitId;
use crate::backend::ObjectKind;
use crate::backend::TreeId;
use crate::commit::CommitNode;
use crate::commit::CommitPos;
use crate::commit::ParentsVec;
use crate::graft::GraftTable;
use crate::object_id::ObjectId as _;

/// Commit-graph error.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The id names an object of another kind (possibly behind a tag).
    #[error("Object {hash} is a {kind}, not a commit")]
    WrongKind {
        /// Hex id of the offending object.
        hash: String,
        /// The kind the object declares.
        kind: ObjectKind,
    },
    /// The commit buffer does not follow the commit grammar.
    #[error("Malformed commit object {hash}: {reason}")]
    BadCommit {
        /// Hex id of the commit.
        hash: String,
        /// What was wrong with the buffer.
        reason: &'static str,
    },
    /// A tag object could not be dereferenced.
    #[error("Malformed tag object {hash}")]
    BadTag {
        /// Hex id of the tag.
        hash: String,
    },
    /// The object store failed to deliver bytes.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// A valid operation attempted, but not supported by this engine.
    #[error("{0}")]
    Unsupported(String),
}

/// Result of commit-graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Objects referenced by a commit, recorded when reverse-reference tracking
/// is enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRefs {
    /// The commit's tree.
    pub tree: TreeId,
    /// The effective parents (after grafts), in order.
    pub parents: Vec<CommitId>,
}

/// The process-wide commit index: arena, interning map and graft table over
/// a [`Backend`].
///
/// All operations assume a single logical thread of control; there is no
/// internal synchronisation.
#[derive(Debug)]
pub struct CommitGraph {
    backend: Box<dyn Backend>,
    nodes: Vec<CommitNode>,
    positions: HashMap<CommitId, CommitPos>,
    known_kinds: HashMap<CommitId, ObjectKind>,
    grafts: GraftTable,
    grafts_prepared: bool,
    save_commit_buffer: bool,
    track_object_refs: bool,
    object_refs: HashMap<CommitId, ObjectRefs>,
}

impl CommitGraph {
    /// A graph over `backend` with no commits interned yet.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            nodes: Vec::new(),
            positions: HashMap::new(),
            known_kinds: HashMap::new(),
            grafts: GraftTable::new(),
            grafts_prepared: false,
            save_commit_buffer: true,
            track_object_refs: false,
            object_refs: HashMap::new(),
        }
    }

    /// Whether raw commit bytes are retained on the node after parsing, so
    /// the pretty-printer can re-read headers cheaply. Defaults to true.
    pub fn set_save_commit_buffer(&mut self, save: bool) {
        self.save_commit_buffer = save;
    }

    /// Whether to record an [`ObjectRefs`] entry per parsed commit.
    /// Defaults to false.
    pub fn set_track_object_refs(&mut self, track: bool) {
        self.track_object_refs = track;
    }

    /// The hash width of the underlying store, in bytes.
    pub fn hash_length(&self) -> usize {
        self.backend.hash_length()
    }

    /// Number of interned commits.
    pub fn num_commits(&self) -> usize {
        self.nodes.len()
    }

    /// The node at `pos`. Also available through indexing.
    pub fn node(&self, pos: CommitPos) -> &CommitNode {
        &self.nodes[pos.0 as usize]
    }

    fn node_mut(&mut self, pos: CommitPos) -> &mut CommitNode {
        &mut self.nodes[pos.0 as usize]
    }

    /// ORs `mask` into the node's flags.
    pub fn add_flags(&mut self, pos: CommitPos, mask: u32) {
        self.node_mut(pos).flags |= mask;
    }

    /// Clears `mask` from the node's flags (this node only; see
    /// [`CommitGraph::clear_marks`] for the ancestor closure).
    pub fn remove_flags(&mut self, pos: CommitPos, mask: u32) {
        self.node_mut(pos).flags &= !mask;
    }

    fn intern(&mut self, id: &CommitId) -> CommitPos {
        if let Some(&pos) = self.positions.get(id) {
            return pos;
        }
        let pos = CommitPos(u32::try_from(self.nodes.len()).unwrap());
        self.nodes.push(CommitNode::new(id.clone()));
        self.positions.insert(id.clone(), pos);
        pos
    }

    /// Returns the interned commit for `id`, creating an unparsed node if
    /// needed. Fails with `WrongKind` when the id is already known to name a
    /// non-commit object.
    pub fn lookup_commit(&mut self, id: &CommitId) -> GraphResult<CommitPos> {
        match self.known_kinds.get(id) {
            Some(ObjectKind::Commit) | None => Ok(self.intern(id)),
            Some(&kind) => Err(GraphError::WrongKind {
                hash: id.hex(),
                kind,
            }),
        }
    }

    fn read_object(&mut self, id: &CommitId) -> GraphResult<(ObjectKind, Vec<u8>)> {
        let (kind, bytes) = self.backend.read_object(id)?;
        self.known_kinds.insert(id.clone(), kind);
        Ok((kind, bytes))
    }

    /// Like [`CommitGraph::lookup_commit`], but first dereferences tag
    /// indirection. Fails with `WrongKind` when the chain does not end at a
    /// commit.
    pub fn lookup_commit_reference(&mut self, id: &CommitId) -> GraphResult<CommitPos> {
        let mut id = id.clone();
        let mut kind;
        loop {
            let (read_kind, bytes) = self.read_object(&id)?;
            kind = read_kind;
            if kind != ObjectKind::Tag {
                break;
            }
            id = tag_target(&id, &bytes)?;
        }
        if kind != ObjectKind::Commit {
            return Err(GraphError::WrongKind {
                hash: id.hex(),
                kind,
            });
        }
        self.lookup_commit(&id)
    }

    /// Like [`CommitGraph::lookup_commit_reference`], but suppresses
    /// diagnostics and turns every failure into `None`.
    pub fn lookup_commit_reference_gently(&mut self, id: &CommitId) -> Option<CommitPos> {
        self.lookup_commit_reference(id).ok()
    }

    /// Parses the commit at `pos`, fetching its bytes from the backend.
    ///
    /// Parsing is idempotent: a node parses at most once and redundant calls
    /// return success without touching it. The raw bytes are retained on the
    /// node when buffer saving is on.
    pub fn parse_commit(&mut self, pos: CommitPos) -> GraphResult<()> {
        if self.node(pos).parsed {
            return Ok(());
        }
        let id = self.node(pos).id.clone();
        let (kind, bytes) = self.read_object(&id)?;
        if kind != ObjectKind::Commit {
            return Err(GraphError::WrongKind {
                hash: id.hex(),
                kind,
            });
        }
        self.parse_commit_buffer(pos, &bytes)?;
        if self.save_commit_buffer {
            self.node_mut(pos).buffer = Some(bytes.into_boxed_slice());
        }
        Ok(())
    }

    /// Parses `buffer` (the textual commit object, header already stripped)
    /// into the node at `pos`.
    ///
    /// A registered graft overrides the textual parents; the parent lines
    /// are still validated and skipped. A parent hash that resolves to a
    /// known non-commit object is silently skipped. On failure the node
    /// stays unparsed, though its tree may already have been set.
    pub fn parse_commit_buffer(&mut self, pos: CommitPos, buffer: &[u8]) -> GraphResult<()> {
        if self.node(pos).parsed {
            return Ok(());
        }
        let id = self.node(pos).id.clone();
        let bad = |reason| GraphError::BadCommit {
            hash: id.hex(),
            reason,
        };
        let hash_hex = self.hash_length() * 2;
        let tree_line_len = 5 + hash_hex + 1;
        if buffer.len() < tree_line_len
            || !buffer.starts_with(b"tree ")
            || buffer[tree_line_len - 1] != b'\n'
        {
            return Err(bad("missing tree header"));
        }
        let tree =
            TreeId::try_from_hex(&buffer[5..5 + hash_hex]).ok_or_else(|| bad("bad tree hash"))?;
        self.node_mut(pos).tree = Some(tree.clone());

        let graft = self.grafts.lookup(&id).cloned();
        let parent_line_len = hash_hex + 8;
        let mut cursor = tree_line_len;
        let mut parent_ids = Vec::new();
        while buffer[cursor..].starts_with(b"parent ") {
            let line = buffer
                .get(cursor..cursor + parent_line_len)
                .ok_or_else(|| bad("bad parent line"))?;
            if line[parent_line_len - 1] != b'\n' {
                return Err(bad("bad parent line"));
            }
            let parent_id = CommitId::try_from_hex(&line[7..7 + hash_hex])
                .ok_or_else(|| bad("bad parent hash"))?;
            cursor += parent_line_len;
            // The graft overrides the textual parents wholesale.
            if graft.is_none() {
                parent_ids.push(parent_id);
            }
        }
        if let Some(graft) = &graft {
            parent_ids.extend(graft.parents().iter().cloned());
        }

        let mut parents = ParentsVec::new();
        for parent_id in &parent_ids {
            match self.lookup_commit(parent_id) {
                Ok(parent) => parents.push(parent),
                // An unresolvable parent is skipped with no error.
                Err(_) => continue,
            }
        }
        let date = parse_commit_date(&buffer[cursor..]);

        if self.track_object_refs {
            self.object_refs.insert(
                id.clone(),
                ObjectRefs {
                    tree,
                    parents: parent_ids,
                },
            );
        }
        let node = self.node_mut(pos);
        node.parents = parents;
        node.date = date;
        node.parsed = true;
        Ok(())
    }

    /// The recorded references of `id`, when tracking is enabled and the
    /// commit has been parsed.
    pub fn object_refs(&self, id: &CommitId) -> Option<&ObjectRefs> {
        self.object_refs.get(id)
    }

    /// The graft table.
    pub fn grafts(&self) -> &GraftTable {
        &self.grafts
    }

    /// The graft table, for registration and removal.
    pub fn grafts_mut(&mut self) -> &mut GraftTable {
        &mut self.grafts
    }

    /// Loads the graft file at `path` into the table, once per graph
    /// lifetime. Subsequent calls are no-ops returning 0.
    pub fn prepare_grafts(&mut self, path: &Path) -> io::Result<usize> {
        if self.grafts_prepared {
            return Ok(0);
        }
        self.grafts_prepared = true;
        let hash_len = self.hash_length();
        self.grafts.read_file(path, hash_len)
    }

    /// Clears `mask` from the flags of `pos` and every ancestor that still
    /// carries any of its bits.
    ///
    /// A node with none of the bits set terminates that branch of the walk:
    /// its ancestors are already clean.
    pub fn clear_marks(&mut self, pos: CommitPos, mask: u32) {
        let mut stack = vec![pos];
        while let Some(pos) = stack.pop() {
            let node = self.node_mut(pos);
            if node.flags & mask == 0 {
                continue;
            }
            node.flags &= !mask;
            stack.extend_from_slice(&node.parents);
        }
    }

    /// The raw bytes of the commit at `pos`: the retained buffer when
    /// present, a fresh backend read otherwise.
    pub fn read_commit_buffer(&self, pos: CommitPos) -> GraphResult<Cow<'_, [u8]>> {
        let node = self.node(pos);
        if let Some(buffer) = node.buffer() {
            return Ok(Cow::Borrowed(buffer));
        }
        let (kind, bytes) = self.backend.read_object(&node.id)?;
        if kind != ObjectKind::Commit {
            return Err(GraphError::WrongKind {
                hash: node.id.hex(),
                kind,
            });
        }
        Ok(Cow::Owned(bytes))
    }
}

impl Index<CommitPos> for CommitGraph {
    type Output = CommitNode;

    fn index(&self, pos: CommitPos) -> &CommitNode {
        self.node(pos)
    }
}

/// Extracts the target id from a tag payload (`object HEX LF type ...`).
fn tag_target(id: &CommitId, buffer: &[u8]) -> GraphResult<CommitId> {
    let bad = || GraphError::BadTag { hash: id.hex() };
    let rest = buffer.strip_prefix(b"object ").ok_or_else(bad)?;
    let eol = rest.find_byte(b'\n').ok_or_else(bad)?;
    CommitId::try_from_hex(&rest[..eol]).ok_or_else(bad)
}

/// Extracts the committer time from the bytes following the parent lines.
/// Any structural surprise yields 0 rather than an error.
fn parse_commit_date(buf: &[u8]) -> u64 {
    if !buf.starts_with(b"author") {
        return 0;
    }
    let Some(eol) = buf.find_byte(b'\n') else {
        return 0;
    };
    let buf = &buf[eol + 1..];
    if !buf.starts_with(b"committer") {
        return 0;
    }
    let Some(gt) = buf.find_byte(b'>') else {
        return 0;
    };
    parse_decimal(&buf[gt + 1..])
}

/// Reads a decimal integer, skipping leading whitespace. Overflow and a
/// missing digit both yield 0.
pub(crate) fn parse_decimal(buf: &[u8]) -> u64 {
    let digits = buf
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit());
    let mut value: u64 = 0;
    let mut seen = false;
    for &b in digits {
        seen = true;
        let digit = u64::from(b - b'0');
        value = match value.checked_mul(10).and_then(|v| v.checked_add(digit)) {
            Some(v) => v,
            None => return 0,
        };
    }
    if seen { value } else { 0 }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::graft::Graft;
    use crate::testutils::TestBackend;
    use crate::testutils::commit_id;
    use crate::testutils::tree_id;

    fn graph_with(build: impl FnOnce(&mut TestBackend)) -> CommitGraph {
        let mut backend = TestBackend::new();
        build(&mut backend);
        CommitGraph::new(Box::new(backend))
    }

    #[test]
    fn test_lookup_interns_one_node_per_id() {
        let mut graph = graph_with(|_| {});
        let a = graph.lookup_commit(&commit_id(1)).unwrap();
        let b = graph.lookup_commit(&commit_id(2)).unwrap();
        assert_ne!(a, b);
        assert_eq!(graph.lookup_commit(&commit_id(1)).unwrap(), a);
        assert_eq!(graph.num_commits(), 2);
        assert_eq!(graph[a].id(), &commit_id(1));
    }

    #[test]
    fn test_parse_commit_populates_node() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
            backend.add_commit(commit_id(2), &[commit_id(1)], 200);
        });
        let head = graph.lookup_commit(&commit_id(2)).unwrap();
        graph.parse_commit(head).unwrap();

        let node = &graph[head];
        assert!(node.is_parsed());
        assert_eq!(node.date(), 200);
        assert_eq!(node.tree(), Some(&tree_id(2)));
        assert_eq!(node.parents().len(), 1);
        let root = node.parents()[0];
        assert_eq!(graph[root].id(), &commit_id(1));
        // The parent was interned but not parsed.
        assert!(!graph[root].is_parsed());
    }

    #[test]
    fn test_parse_commit_is_idempotent() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
        });
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        graph.parse_commit(pos).unwrap();
        let date = graph[pos].date();
        graph.parse_commit(pos).unwrap();
        assert_eq!(graph[pos].date(), date);
    }

    #[test]
    fn test_parse_commit_retains_buffer_by_default() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
        });
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        graph.parse_commit(pos).unwrap();
        assert!(graph[pos].buffer().is_some());
    }

    #[test]
    fn test_parse_commit_without_buffer_saving() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
        });
        graph.set_save_commit_buffer(false);
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        graph.parse_commit(pos).unwrap();
        assert!(graph[pos].buffer().is_none());
        // The pretty-printer path re-reads from the backend instead.
        let buffer = graph.read_commit_buffer(pos).unwrap();
        assert!(buffer.starts_with(b"tree "));
    }

    #[test]
    fn test_parse_empty_buffer_is_bad_commit() {
        let mut graph = graph_with(|_| {});
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        assert_matches!(
            graph.parse_commit_buffer(pos, b""),
            Err(GraphError::BadCommit { .. })
        );
        assert!(!graph[pos].is_parsed());
    }

    #[test]
    fn test_parse_bad_tree_header() {
        let mut graph = graph_with(|_| {});
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        assert_matches!(
            graph.parse_commit_buffer(pos, b"tree short\n"),
            Err(GraphError::BadCommit { .. })
        );
        let buffer = format!("tree {}\n", "g".repeat(40));
        assert_matches!(
            graph.parse_commit_buffer(pos, buffer.as_bytes()),
            Err(GraphError::BadCommit { .. })
        );
    }

    #[test]
    fn test_parse_bad_parent_line() {
        let mut graph = graph_with(|_| {});
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        let buffer = format!("tree {}\nparent truncated", tree_id(1).hex());
        assert_matches!(
            graph.parse_commit_buffer(pos, buffer.as_bytes()),
            Err(GraphError::BadCommit { .. })
        );
        assert!(!graph[pos].is_parsed());
    }

    #[test]
    fn test_parse_missing_ident_lines_gives_date_zero() {
        let mut graph = graph_with(|_| {});
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        let buffer = format!("tree {}\n\nno idents at all\n", tree_id(1).hex());
        graph.parse_commit_buffer(pos, buffer.as_bytes()).unwrap();
        assert_eq!(graph[pos].date(), 0);
    }

    #[test]
    fn test_parse_author_missing_email_end_gives_date_zero() {
        let mut graph = graph_with(|_| {});
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        let buffer = format!(
            "tree {}\nauthor Broken <broken@example.com 100 +0000\ncommitter also broken\n\nx\n",
            tree_id(1).hex()
        );
        graph.parse_commit_buffer(pos, buffer.as_bytes()).unwrap();
        assert_eq!(graph[pos].date(), 0);
    }

    #[test]
    fn test_parse_overflowing_date_gives_zero() {
        let mut graph = graph_with(|_| {});
        let pos = graph.lookup_commit(&commit_id(1)).unwrap();
        let buffer = format!(
            "tree {}\nauthor A <a@example.com> 99999999999999999999999999 +0000\n\
             committer A <a@example.com> 99999999999999999999999999 +0000\n\nx\n",
            tree_id(1).hex()
        );
        graph.parse_commit_buffer(pos, buffer.as_bytes()).unwrap();
        assert_eq!(graph[pos].date(), 0);
    }

    #[test]
    fn test_graft_overrides_textual_parents() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
            backend.add_commit(commit_id(2), &[], 150);
            backend.add_commit(commit_id(3), &[commit_id(1)], 200);
        });
        graph
            .grafts_mut()
            .register(Graft::new(commit_id(3), vec![commit_id(2)]), false);
        let pos = graph.lookup_commit(&commit_id(3)).unwrap();
        graph.parse_commit(pos).unwrap();
        let parents: Vec<_> = graph[pos]
            .parents()
            .iter()
            .map(|&parent| graph[parent].id().clone())
            .collect();
        assert_eq!(parents, vec![commit_id(2)]);
    }

    #[test]
    fn test_shallow_graft_hides_parents() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
            backend.add_commit(commit_id(2), &[commit_id(1)], 200);
        });
        graph.grafts_mut().register(Graft::shallow(commit_id(2)), false);
        let pos = graph.lookup_commit(&commit_id(2)).unwrap();
        graph.parse_commit(pos).unwrap();
        assert!(graph[pos].parents().is_empty());
        // The commit shows up in the shallow export.
        let mut out = Vec::new();
        let count = graph
            .grafts()
            .write_shallow(&mut out, crate::graft::PacketMode::Raw);
        assert_eq!(count, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{}\n", commit_id(2).hex())
        );
    }

    #[test]
    fn test_parent_of_known_non_commit_kind_is_skipped() {
        let mut graph = graph_with(|backend| {
            backend.add_object(commit_id(1), ObjectKind::Blob, b"junk".to_vec());
            backend.add_commit(commit_id(2), &[commit_id(1)], 200);
        });
        // Teach the graph that id 1 is a blob.
        assert_matches!(
            graph.lookup_commit_reference(&commit_id(1)),
            Err(GraphError::WrongKind { .. })
        );
        let pos = graph.lookup_commit(&commit_id(2)).unwrap();
        graph.parse_commit(pos).unwrap();
        // The bogus parent is skipped without failing the parse.
        assert!(graph[pos].parents().is_empty());
    }

    #[test]
    fn test_lookup_commit_wrong_kind() {
        let mut graph = graph_with(|backend| {
            backend.add_object(commit_id(1), ObjectKind::Tree, vec![]);
        });
        assert_matches!(
            graph.lookup_commit_reference(&commit_id(1)),
            Err(GraphError::WrongKind {
                kind: ObjectKind::Tree,
                ..
            })
        );
        // The kind is now known, so a plain lookup refuses too.
        assert_matches!(
            graph.lookup_commit(&commit_id(1)),
            Err(GraphError::WrongKind { .. })
        );
    }

    #[test]
    fn test_lookup_commit_reference_peels_tags() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
            backend.add_tag(commit_id(8), commit_id(1), "v1.0");
            backend.add_tag(commit_id(9), commit_id(8), "v1.0-signed");
        });
        let direct = graph.lookup_commit(&commit_id(1)).unwrap();
        let through_tag = graph.lookup_commit_reference(&commit_id(9)).unwrap();
        assert_eq!(direct, through_tag);
    }

    #[test]
    fn test_lookup_commit_reference_gently_swallows_errors() {
        let mut graph = graph_with(|backend| {
            backend.add_object(commit_id(1), ObjectKind::Blob, vec![]);
        });
        assert_eq!(graph.lookup_commit_reference_gently(&commit_id(1)), None);
        assert_eq!(graph.lookup_commit_reference_gently(&commit_id(7)), None);
    }

    #[test]
    fn test_object_refs_tracking() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
            backend.add_commit(commit_id(2), &[commit_id(1)], 200);
        });
        graph.set_track_object_refs(true);
        let pos = graph.lookup_commit(&commit_id(2)).unwrap();
        graph.parse_commit(pos).unwrap();
        let refs = graph.object_refs(&commit_id(2)).unwrap();
        assert_eq!(refs.tree, tree_id(2));
        assert_eq!(refs.parents, vec![commit_id(1)]);
        assert_eq!(graph.object_refs(&commit_id(1)), None);
    }

    #[test]
    fn test_clear_marks_over_ancestor_closure() {
        let mut graph = graph_with(|backend| {
            backend.add_commit(commit_id(1), &[], 100);
            backend.add_commit(commit_id(2), &[commit_id(1)], 200);
            backend.add_commit(commit_id(3), &[commit_id(2)], 300);
        });
        let head = graph.lookup_commit(&commit_id(3)).unwrap();
        graph.parse_commit(head).unwrap();
        let mid = graph[head].parents()[0];
        graph.parse_commit(mid).unwrap();
        let root = graph[mid].parents()[0];
        graph.parse_commit(root).unwrap();

        graph.add_flags(head, 0b11);
        graph.add_flags(mid, 0b01);
        graph.add_flags(root, 0b01);
        graph.clear_marks(head, 0b01);
        assert_eq!(graph[head].flags(), 0b10);
        assert_eq!(graph[mid].flags(), 0);
        assert_eq!(graph[root].flags(), 0);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(b" 12345 rest"), 12345);
        assert_eq!(parse_decimal(b"12345"), 12345);
        assert_eq!(parse_decimal(b" nope"), 0);
        assert_eq!(parse_decimal(b""), 0);
        assert_eq!(parse_decimal(b"99999999999999999999999999"), 0);
    }
}
