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

//! `%`-token substitution for `format:` templates.

use bstr::BString;
use bstr::ByteSlice as _;

use crate::commit::BOUNDARY;
use crate::commit::CommitNode;
use crate::commit::CommitPos;
use crate::commit::SYMMETRIC_LEFT;
use crate::date::DateMode;
use crate::date::show_date;
use crate::graph::CommitGraph;
use crate::graph::GraphResult;
use crate::object_id::ObjectId as _;
use crate::pretty::PrettyOptions;
use crate::pretty::get_header_value;
use crate::pretty::parse_ident_date;

/// Hashes in `%P`/`%p` accumulate into a buffer of at most this many bytes;
/// the excess is silently dropped.
const PARENTS_MAX: usize = 1024;

/// Substituted for a token whose value cannot be derived from the commit.
const UNKNOWN: &[u8] = b"<unknown>";

/// A parsed `NAME <EMAIL> TIME TZ` ident line.
struct Ident<'a> {
    name: &'a [u8],
    email: &'a [u8],
    time: u64,
    tz: i32,
}

fn parse_ident(line: &[u8]) -> Option<Ident<'_>> {
    let lt = line.find_byte(b'<')?;
    let gt = lt + line[lt..].find_byte(b'>')?;
    let mut name_end = lt;
    while name_end > 0 && line[name_end - 1].is_ascii_whitespace() {
        name_end -= 1;
    }
    let (time, tz) = parse_ident_date(&line[gt + 1..]);
    Some(Ident {
        name: &line[..name_end],
        email: &line[lt + 1..gt],
        time,
        tz,
    })
}

/// Splits the message into the folded subject paragraph and the remaining
/// body.
fn message_parts(buffer: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let message: &[u8] = match buffer.find(b"\n\n") {
        Some(at) => &buffer[at + 2..],
        None => b"",
    };
    let lines: Vec<&[u8]> = message.lines().collect();
    let mut at = 0;
    while at < lines.len() && lines[at].is_empty() {
        at += 1;
    }
    let mut subject: Vec<u8> = Vec::new();
    while at < lines.len() && !lines[at].is_empty() {
        if !subject.is_empty() {
            subject.push(b' ');
        }
        subject.extend_from_slice(lines[at]);
        at += 1;
    }
    while at < lines.len() && lines[at].is_empty() {
        at += 1;
    }
    let mut body: Vec<u8> = Vec::new();
    for line in &lines[at..] {
        body.extend_from_slice(line);
        body.push(b'\n');
    }
    (subject, body)
}

fn abbreviate(hex: String, abbrev: usize) -> String {
    if abbrev > 0 && abbrev < hex.len() {
        hex[..abbrev].to_string()
    } else {
        hex
    }
}

/// Joins the parent hashes, space-prefixed, into the bounded parents
/// buffer.
fn format_parents(graph: &CommitGraph, node: &CommitNode, abbrev: usize) -> Vec<u8> {
    let mut joined = Vec::new();
    for &parent in node.parents() {
        let hex = abbreviate(graph[parent].id().hex(), abbrev);
        if joined.len() + hex.len() + 1 > PARENTS_MAX {
            break;
        }
        joined.push(b' ');
        joined.extend_from_slice(hex.as_bytes());
    }
    if !joined.is_empty() {
        joined.remove(0);
    }
    joined
}

fn ident_token(
    ident: Option<&Ident<'_>>,
    which: u8,
    date_mode: DateMode,
) -> Option<Option<Vec<u8>>> {
    let value = match which {
        b'n' => ident.map(|ident| ident.name.to_vec()),
        b'e' => ident.map(|ident| ident.email.to_vec()),
        b'd' => ident.map(|ident| show_date(ident.time, ident.tz, date_mode).into_bytes()),
        b'D' => ident.map(|ident| show_date(ident.time, ident.tz, DateMode::Rfc2822).into_bytes()),
        b'r' => ident.map(|ident| show_date(ident.time, ident.tz, DateMode::Relative).into_bytes()),
        b't' => ident.map(|ident| ident.time.to_string().into_bytes()),
        b'i' => ident.map(|ident| show_date(ident.time, ident.tz, DateMode::Iso8601).into_bytes()),
        _ => return None,
    };
    Some(value)
}

/// Substitutes the `%`-tokens of `template` with the commit's values.
///
/// Tokens that are not in the table pass through literally; tokens whose
/// value cannot be derived render `<unknown>`. The commit should have been
/// parsed already, so the parent tokens see the effective parent list.
pub fn interpolate(
    graph: &CommitGraph,
    commit: CommitPos,
    template: &str,
    options: &PrettyOptions,
) -> GraphResult<BString> {
    let buffer = graph.read_commit_buffer(commit)?;
    let node = &graph[commit];
    let author = get_header_value(&buffer, "author").and_then(parse_ident);
    let committer = get_header_value(&buffer, "committer").and_then(parse_ident);
    let encoding = get_header_value(&buffer, "encoding");
    let (subject, body) = message_parts(&buffer);
    let abbrev = options.abbrev;

    let mut out: Vec<u8> = Vec::new();
    let bytes = template.as_bytes();
    let mut at = 0;
    while at < bytes.len() {
        if bytes[at] != b'%' {
            out.push(bytes[at]);
            at += 1;
            continue;
        }
        let rest = &bytes[at + 1..];
        // `(consumed, value)`: how much of the template the token ate, and
        // its substitution; None value renders as <unknown>.
        let expansion: Option<(usize, Option<Vec<u8>>)> = if rest.starts_with(b"Creset") {
            Some((6, Some(b"\x1b[m".to_vec())))
        } else if rest.starts_with(b"Cgreen") {
            Some((6, Some(b"\x1b[32m".to_vec())))
        } else if rest.starts_with(b"Cblue") {
            Some((5, Some(b"\x1b[34m".to_vec())))
        } else if rest.starts_with(b"Cred") {
            Some((4, Some(b"\x1b[31m".to_vec())))
        } else {
            match rest.first().copied() {
                Some(b'H') => Some((1, Some(node.id().hex().into_bytes()))),
                Some(b'h') => Some((1, Some(abbreviate(node.id().hex(), abbrev).into_bytes()))),
                Some(b'T') => Some((1, node.tree().map(|tree| tree.hex().into_bytes()))),
                Some(b't') => Some((
                    1,
                    node.tree().map(|tree| abbreviate(tree.hex(), abbrev).into_bytes()),
                )),
                Some(b'P') => Some((1, Some(format_parents(graph, node, 0)))),
                Some(b'p') => Some((1, Some(format_parents(graph, node, abbrev)))),
                Some(b'e') => Some((1, encoding.map(<[u8]>::to_vec))),
                Some(b's') => Some((1, Some(subject.clone()))),
                Some(b'b') => Some((1, Some(body.clone()))),
                Some(b'n') => Some((1, Some(b"\n".to_vec()))),
                Some(b'm') => {
                    let marker: &[u8] = if node.has_flags(BOUNDARY) {
                        b"-"
                    } else if node.has_flags(SYMMETRIC_LEFT) {
                        b"<"
                    } else {
                        b">"
                    };
                    Some((1, Some(marker.to_vec())))
                }
                Some(b'a') => rest
                    .get(1)
                    .and_then(|&which| ident_token(author.as_ref(), which, options.date_mode))
                    .map(|value| (2, value)),
                Some(b'c') => rest
                    .get(1)
                    .and_then(|&which| ident_token(committer.as_ref(), which, options.date_mode))
                    .map(|value| (2, value)),
                _ => None,
            }
        };
        match expansion {
            Some((consumed, value)) => {
                out.extend_from_slice(value.as_deref().unwrap_or(UNKNOWN));
                at += 1 + consumed;
            }
            None => {
                out.push(b'%');
                at += 1;
            }
        }
    }
    Ok(BString::from(out))
}
