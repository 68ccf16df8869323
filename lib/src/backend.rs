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

use std::fmt;
use std::fmt::Debug;

use thiserror::Error;

use crate::object_id::id_type;

id_type!(
    /// Identifier for a commit based on its content. Two commits with the
    /// same id are the same commit.
    pub CommitId
);
id_type!(pub TreeId);

/// The kind an object in the store declares for itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Object-store error that may occur after the backend is loaded.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Object {hash} not found")]
    ObjectNotFound { hash: String },
    #[error("Error when reading object {hash}")]
    ReadObject {
        hash: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Defines the interface for object storage backends.
///
/// The commit graph only needs to fetch raw object bytes; everything else
/// (packing, compression, the object header) is the backend's business.
pub trait Backend: Debug {
    /// The length of object hashes in bytes.
    fn hash_length(&self) -> usize;

    /// Fetches the stored bytes and declared kind of the object named `id`.
    ///
    /// The returned buffer is the object payload with the storage header
    /// already stripped.
    fn read_object(&self, id: &CommitId) -> BackendResult<(ObjectKind, Vec<u8>)>;
}
