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

#![warn(missing_docs)]
#![deny(unused_must_use)]

//! Library for Relic - a git-compatible version control system.
//!
//! This crate implements the commit-graph core: parsing raw commit objects
//! into an interned DAG, graft and shallow overrides of the parent sets,
//! chronological and topological history traversal, merge-base computation,
//! and the commit presentation formats.

pub mod backend;
pub mod commit;
pub mod date;
pub mod graft;
pub mod graph;
pub mod hex_util;
pub mod merge_base;
pub mod object_id;
pub mod pretty;
pub mod template;
pub mod walk;

#[cfg(test)]
pub(crate) mod testutils;
