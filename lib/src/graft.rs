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

//! Grafts: load-time overrides of a commit's parent set.
//!
//! A graft file is plain text with one record per line, `HEX (SP HEX)*`,
//! where the first hash names the commit and the rest replace its parents.
//! A record with no parents declares the commit *shallow*: a history
//! boundary whose real parents are intentionally hidden, as left behind by
//! a partial fetch.

use std::fs;
use std::io;
use std::io::Write as _;
use std::path::Path;

use thiserror::Error;

use crate::backend::CommitId;
use crate::object_id::ObjectId as _;

/// Maximum accepted graft-file line length, in bytes.
const MAX_GRAFT_LINE: usize = 1024;

/// A parent-set override for one commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graft {
    id: CommitId,
    parents: Vec<CommitId>,
}

impl Graft {
    /// A graft replacing the commit's parents with `parents`.
    pub fn new(id: CommitId, parents: Vec<CommitId>) -> Self {
        Self { id, parents }
    }

    /// A graft hiding all of the commit's parents.
    pub fn shallow(id: CommitId) -> Self {
        Self::new(id, vec![])
    }

    /// The commit this graft applies to.
    pub fn id(&self) -> &CommitId {
        &self.id
    }

    /// The replacement parents, in order.
    pub fn parents(&self) -> &[CommitId] {
        &self.parents
    }

    /// A graft with no parents marks a history boundary.
    pub fn is_shallow(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Error for a single malformed graft-file line. Loading logs these and
/// drops the line; the rest of the file is still used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraftParseError {
    /// The line is longer than the format allows.
    #[error("graft line exceeds {MAX_GRAFT_LINE} bytes")]
    LineTooLong,
    /// The line is not a space-separated sequence of full-width hashes.
    #[error("malformed graft record: {line}")]
    Malformed {
        /// The offending line, verbatim.
        line: String,
    },
}

/// What [`GraftTable::register`] did with the entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// No entry existed for the commit; the graft was inserted.
    Added,
    /// An entry existed and was replaced.
    Replaced,
    /// An entry existed and `ignore_dups` discarded the new one.
    Ignored,
}

/// How [`GraftTable::write_shallow`] frames its records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketMode {
    /// One `HEX LF` line per record.
    Raw,
    /// One pkt-line `shallow HEX` per record, for the fetch protocol.
    PktLine,
}

/// The set of registered grafts, kept sorted by commit id.
#[derive(Clone, Debug, Default)]
pub struct GraftTable {
    entries: Vec<Graft>,
}

impl GraftTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered grafts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no graft is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn pos(&self, id: &CommitId) -> Result<usize, usize> {
        self.entries.binary_search_by(|graft| graft.id.cmp(id))
    }

    /// Returns the graft registered for `id`, if any.
    pub fn lookup(&self, id: &CommitId) -> Option<&Graft> {
        self.pos(id).ok().map(|at| &self.entries[at])
    }

    /// Inserts `graft` at its sorted position. On a collision the existing
    /// entry is replaced, unless `ignore_dups` is set, in which case the new
    /// entry is discarded.
    pub fn register(&mut self, graft: Graft, ignore_dups: bool) -> RegisterOutcome {
        match self.pos(&graft.id) {
            Ok(_) if ignore_dups => RegisterOutcome::Ignored,
            Ok(at) => {
                self.entries[at] = graft;
                RegisterOutcome::Replaced
            }
            Err(at) => {
                self.entries.insert(at, graft);
                RegisterOutcome::Added
            }
        }
    }

    /// Removes the graft for `id`, compacting the table.
    pub fn unregister(&mut self, id: &CommitId) -> Option<Graft> {
        self.pos(id).ok().map(|at| self.entries.remove(at))
    }

    /// Registered grafts in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Graft> {
        self.entries.iter()
    }

    /// Parses one graft-file line. Blank lines and `#` comments yield
    /// `Ok(None)`.
    pub fn parse_line(line: &str, hash_len: usize) -> Result<Option<Graft>, GraftParseError> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        if line.len() > MAX_GRAFT_LINE {
            return Err(GraftParseError::LineTooLong);
        }
        let malformed = || GraftParseError::Malformed {
            line: line.to_string(),
        };
        let record = hash_len * 2;
        if (line.len() + 1) % (record + 1) != 0 {
            return Err(malformed());
        }
        let mut hashes = Vec::new();
        for field in line.split(' ') {
            if field.len() != record {
                return Err(malformed());
            }
            let id = CommitId::try_from_hex(field).ok_or_else(malformed)?;
            hashes.push(id);
        }
        let mut hashes = hashes.into_iter();
        let id = hashes.next().ok_or_else(malformed)?;
        Ok(Some(Graft::new(id, hashes.collect())))
    }

    /// Registers every valid record in `text`, with duplicates ignored.
    /// Malformed lines are logged and dropped. Returns the number of grafts
    /// actually added.
    pub fn load(&mut self, text: &str, hash_len: usize) -> usize {
        let mut added = 0;
        for (lineno, line) in text.lines().enumerate() {
            match Self::parse_line(line, hash_len) {
                Ok(Some(graft)) => {
                    if self.register(graft, true) != RegisterOutcome::Ignored {
                        added += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(line = lineno + 1, %err, "invalid graft line");
                }
            }
        }
        added
    }

    /// Loads the graft file at `path`. A missing file is not an error; the
    /// table is simply left as it is.
    pub fn read_file(&mut self, path: &Path, hash_len: usize) -> io::Result<usize> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };
        Ok(self.load(&text, hash_len))
    }

    /// Writes every shallow record to `out`, raw or pkt-line framed.
    ///
    /// A write failure truncates the stream: the loop stops and the number
    /// of records written so far is returned.
    pub fn write_shallow(&self, out: &mut dyn io::Write, mode: PacketMode) -> usize {
        let mut written = 0;
        for graft in self.entries.iter().filter(|graft| graft.is_shallow()) {
            let result = match mode {
                PacketMode::Raw => out.write_all(format!("{}\n", graft.id.hex()).as_bytes()),
                PacketMode::PktLine => {
                    let line = format!("shallow {}\n", graft.id.hex());
                    out.write_all(&pkt_line(line.as_bytes()))
                }
            };
            if let Err(err) = result {
                tracing::warn!(%err, "shallow export truncated");
                break;
            }
            written += 1;
        }
        written
    }
}

/// Frames `payload` as a pkt-line: a four-digit hex length prefix counting
/// itself, then the payload.
fn pkt_line(payload: &[u8]) -> Vec<u8> {
    let mut pkt = format!("{:04x}", payload.len() + 4).into_bytes();
    pkt.extend_from_slice(payload);
    pkt
}
