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

//! Commit presentation: the fixed format catalogue and its renderer.
//!
//! Formats must stay byte-exact with the existing tooling that consumes
//! them, so the renderer works on the raw commit bytes rather than parsed
//! fields: headers are re-read from the buffer, non-ASCII mail headers are
//! RFC 2047 quoted, and the log message is optionally re-encoded into the
//! caller's output encoding first.

use std::borrow::Cow;

use bstr::BString;
use bstr::ByteSlice as _;
use thiserror::Error;

use crate::commit::CommitPos;
use crate::date::DateMode;
use crate::date::show_date;
use crate::graph::CommitGraph;
use crate::graph::GraphError;
use crate::graph::parse_decimal;
use crate::object_id::ObjectId as _;
use crate::template;

/// The fixed catalogue of presentation formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitFormat {
    /// Headers verbatim, body indented.
    Raw,
    /// Author line and date, indented body.
    #[default]
    Medium,
    /// Author line and the one-line subject.
    Short,
    /// RFC 822-ish headers, subject line, body.
    Email,
    /// Author and committer, no dates.
    Full,
    /// Author and committer with both dates.
    Fuller,
    /// Subject only.
    Oneline,
    /// A caller-supplied `%`-token template.
    UserFormat,
}

/// A parsed `--pretty` selector: the format plus, for `format:`, the user
/// template it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrettyFormat {
    kind: CommitFormat,
    user_template: Option<String>,
}

impl PrettyFormat {
    /// A selector for one of the fixed formats.
    pub fn new(kind: CommitFormat) -> Self {
        Self {
            kind,
            user_template: None,
        }
    }

    /// A `format:` selector carrying `template`.
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            kind: CommitFormat::UserFormat,
            user_template: Some(template.into()),
        }
    }

    /// The selected format.
    pub fn kind(&self) -> CommitFormat {
        self.kind
    }

    /// The user template, for `format:` selectors.
    pub fn user_template(&self) -> Option<&str> {
        self.user_template.as_deref()
    }
}

/// Commit presentation error.
#[derive(Debug, Error)]
pub enum PrettyError {
    /// The `--pretty` selector matches nothing in the catalogue.
    #[error("Invalid --pretty format: {0}")]
    BadFormat(String),
    /// The commit bytes could not be fetched or are malformed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Format names with their minimum unambiguous prefix lengths.
const FORMAT_CATALOGUE: &[(&str, usize, CommitFormat)] = &[
    ("raw", 1, CommitFormat::Raw),
    ("medium", 1, CommitFormat::Medium),
    ("short", 1, CommitFormat::Short),
    ("email", 1, CommitFormat::Email),
    ("full", 5, CommitFormat::Full),
    ("fuller", 5, CommitFormat::Fuller),
    ("oneline", 1, CommitFormat::Oneline),
];

/// Parses a `--pretty` selector. Names may be shortened down to their
/// minimum prefix, an optional leading `=` is accepted, and `format:` stores
/// the rest of the string as the user template.
pub fn parse_format(arg: &str) -> Result<PrettyFormat, PrettyError> {
    let spec = arg.strip_prefix('=').unwrap_or(arg);
    if let Some(template) = spec.strip_prefix("format:") {
        return Ok(PrettyFormat::with_template(template));
    }
    if !spec.is_empty() {
        for &(name, min_len, kind) in FORMAT_CATALOGUE {
            if name.starts_with(spec) && (spec.len() >= min_len || spec.len() == name.len()) {
                return Ok(PrettyFormat::new(kind));
            }
        }
    }
    Err(PrettyError::BadFormat(arg.to_string()))
}

/// Resolves the output encoding from the caller's preferences: the log
/// output encoding wins, then the commit encoding, then UTF-8.
pub fn default_output_encoding(log_pref: Option<&str>, commit_pref: Option<&str>) -> String {
    [log_pref, commit_pref]
        .into_iter()
        .flatten()
        .find(|pref| !pref.is_empty())
        .unwrap_or("utf-8")
        .to_string()
}

/// Caller-tunable presentation knobs.
#[derive(Clone, Debug, Default)]
pub struct PrettyOptions {
    /// Hex digits for abbreviated hashes; 0 renders full hashes.
    pub abbrev: usize,
    /// How dates are rendered outside email mode.
    pub date_mode: DateMode,
    /// Prefix emitted before the subject line, e.g. `Subject: [PATCH] `.
    pub subject: Option<String>,
    /// Extra header block emitted right after the subject line.
    pub after_subject: Option<String>,
    /// Desired output encoding for the log message. `None` keeps the
    /// commit's own encoding and skips re-encoding entirely.
    pub output_encoding: Option<String>,
}

/// Renders `commit` in the given format.
///
/// The commit should have been parsed already: the `Merge:` line and the
/// parent tokens come from the parsed parent list. Output is bytes, since a
/// commit buffer is not obliged to be valid UTF-8.
pub fn format_commit(
    graph: &CommitGraph,
    commit: CommitPos,
    format: &PrettyFormat,
    options: &PrettyOptions,
) -> Result<BString, PrettyError> {
    if format.kind() == CommitFormat::UserFormat {
        let user_template = format.user_template().unwrap_or("");
        return Ok(template::interpolate(graph, commit, user_template, options)?);
    }
    let buffer = graph.read_commit_buffer(commit)?;
    let encoding = options.output_encoding.clone().unwrap_or_else(|| "utf-8".to_string());
    let buffer = match options.output_encoding.as_deref() {
        Some(output_encoding) => match reencode_message(&buffer, output_encoding) {
            Some(reencoded) => Cow::Owned(reencoded),
            None => buffer,
        },
        None => buffer,
    };
    render(graph, commit, format.kind(), options, &buffer, &encoding).map(BString::from)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// Body lines are emitted with their trailing whitespace dropped.
fn trim_end_ws(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |at| at + 1);
    &line[..end]
}

fn render(
    graph: &CommitGraph,
    pos: CommitPos,
    kind: CommitFormat,
    options: &PrettyOptions,
    buffer: &[u8],
    encoding: &str,
) -> Result<Vec<u8>, PrettyError> {
    let parent_line_len = graph.hash_length() * 2 + 8;
    let mut out: Vec<u8> = Vec::new();
    let mut rest = buffer;
    let mut parents_shown = false;

    // Header lines run up to the first blank line.
    while !rest.is_empty() {
        let line_len = rest.find_byte(b'\n').map_or(rest.len(), |at| at + 1);
        let (line, next) = rest.split_at(line_len);
        rest = next;
        if line == b"\n" {
            break;
        }
        if kind == CommitFormat::Raw {
            out.extend_from_slice(line);
            continue;
        }
        let content = line.strip_suffix(b"\n").unwrap_or(line);
        if content.starts_with(b"parent ") {
            if line.len() != parent_line_len {
                return Err(GraphError::BadCommit {
                    hash: graph[pos].id().hex(),
                    reason: "bad parent line",
                }
                .into());
            }
            continue;
        }
        if !parents_shown {
            add_merge_info(graph, pos, kind, options.abbrev, &mut out);
            parents_shown = true;
        }
        if let Some(ident) = content.strip_prefix(b"author ") {
            add_user_info("Author", kind, options, ident, encoding, &mut out);
        }
        if let Some(ident) = content.strip_prefix(b"committer ")
            && matches!(kind, CommitFormat::Full | CommitFormat::Fuller)
        {
            add_user_info("Commit", kind, options, ident, encoding, &mut out);
        }
        // Remaining headers (tree, encoding, ...) are not shown.
    }

    // Blank separator between headers and body; in subject mode the caller's
    // subject line takes its place.
    if kind != CommitFormat::Oneline && options.subject.is_none() {
        out.push(b'\n');
    }

    let lines: Vec<&[u8]> = rest.lines().collect();
    let mut at = 0;
    while at < lines.len() && is_blank(lines[at]) {
        at += 1;
    }
    let mut email_body_empty = true;
    match kind {
        CommitFormat::Oneline | CommitFormat::Email => {
            // The subject is the first paragraph, folded into one title.
            let separator: &[u8] = if kind == CommitFormat::Email { b"\n " } else { b" " };
            let mut title: Vec<u8> = Vec::new();
            while at < lines.len() && !is_blank(lines[at]) {
                if !title.is_empty() {
                    title.extend_from_slice(separator);
                }
                title.extend_from_slice(trim_end_ws(lines[at]));
                at += 1;
            }
            if let Some(prefix) = &options.subject {
                out.extend_from_slice(prefix.as_bytes());
            }
            if kind == CommitFormat::Email {
                add_rfc2047(&mut out, &title, encoding);
            } else {
                out.extend_from_slice(&title);
            }
            out.push(b'\n');
            if let Some(after_subject) = &options.after_subject {
                out.extend_from_slice(after_subject.as_bytes());
            }
            if kind == CommitFormat::Email {
                email_body_empty = lines[at..].iter().all(|line| is_blank(line));
                for line in &lines[at..] {
                    out.extend_from_slice(trim_end_ws(line));
                    out.push(b'\n');
                }
            }
        }
        _ => {
            let mut in_body = false;
            for line in &lines[at..] {
                if is_blank(line) {
                    if !in_body {
                        continue;
                    }
                    // Short format stops at the end of the first paragraph.
                    if kind == CommitFormat::Short {
                        break;
                    }
                } else {
                    in_body = true;
                }
                out.extend_from_slice(b"    ");
                out.extend_from_slice(trim_end_ws(line));
                out.push(b'\n');
            }
        }
    }

    while out.last().is_some_and(u8::is_ascii_whitespace) {
        out.pop();
    }
    if kind != CommitFormat::Oneline {
        out.push(b'\n');
    }
    // mbox consumers want the blank line after the headers even when the
    // body is empty.
    if kind == CommitFormat::Email && email_body_empty {
        out.push(b'\n');
    }
    Ok(out)
}

/// Emits the single `Merge:` line for commits with two or more parents.
fn add_merge_info(
    graph: &CommitGraph,
    pos: CommitPos,
    kind: CommitFormat,
    abbrev: usize,
    out: &mut Vec<u8>,
) {
    if matches!(kind, CommitFormat::Oneline | CommitFormat::Email) {
        return;
    }
    let parents = graph[pos].parents();
    if parents.len() < 2 {
        return;
    }
    out.extend_from_slice(b"Merge:");
    for &parent in parents {
        let hex = graph[parent].id().hex();
        out.push(b' ');
        if abbrev > 0 && abbrev < hex.len() {
            out.extend_from_slice(hex[..abbrev].as_bytes());
            out.extend_from_slice(b"...");
        } else {
            out.extend_from_slice(hex.as_bytes());
        }
    }
    out.push(b'\n');
}

/// Emits the `Author:`/`Commit:`/`From:` line for an ident header, plus the
/// `Date:` line the format asks for. An ident without a `>` terminator has
/// nothing to show and is omitted.
fn add_user_info(
    what: &str,
    kind: CommitFormat,
    options: &PrettyOptions,
    line: &[u8],
    encoding: &str,
    out: &mut Vec<u8>,
) {
    if kind == CommitFormat::Oneline {
        return;
    }
    let Some(gt) = line.find_byte(b'>') else {
        return;
    };
    let (time, tz) = parse_ident_date(&line[gt + 1..]);
    if kind == CommitFormat::Email {
        let Some(lt) = line.find_byte(b'<') else {
            return;
        };
        let mut name_end = lt;
        while name_end > 0 && line[name_end - 1].is_ascii_whitespace() {
            name_end -= 1;
        }
        out.extend_from_slice(b"From: ");
        add_rfc2047(out, &line[..name_end], encoding);
        out.extend_from_slice(&line[name_end..=gt]);
        out.push(b'\n');
    } else {
        let filler = if kind == CommitFormat::Fuller { "    " } else { "" };
        out.extend_from_slice(format!("{what}: {filler}").as_bytes());
        out.extend_from_slice(&line[..=gt]);
        out.push(b'\n');
    }
    match kind {
        CommitFormat::Medium => {
            let date = show_date(time, tz, options.date_mode);
            out.extend_from_slice(format!("Date:   {date}\n").as_bytes());
        }
        CommitFormat::Email => {
            let date = show_date(time, tz, DateMode::Rfc2822);
            out.extend_from_slice(format!("Date: {date}\n").as_bytes());
        }
        CommitFormat::Fuller => {
            let date = show_date(time, tz, options.date_mode);
            out.extend_from_slice(format!("{what} date: {date}\n").as_bytes());
        }
        _ => {}
    }
}

/// Reads the `TIME TZ` tail of an ident line. Returns `(0, 0)` pieces for
/// whatever is missing.
pub(crate) fn parse_ident_date(buf: &[u8]) -> (u64, i32) {
    let mut at = 0;
    while at < buf.len() && buf[at].is_ascii_whitespace() {
        at += 1;
    }
    let time_start = at;
    while at < buf.len() && buf[at].is_ascii_digit() {
        at += 1;
    }
    let time = parse_decimal(&buf[time_start..at]);
    while at < buf.len() && buf[at].is_ascii_whitespace() {
        at += 1;
    }
    let mut sign = 1;
    if at < buf.len() && (buf[at] == b'+' || buf[at] == b'-') {
        if buf[at] == b'-' {
            sign = -1;
        }
        at += 1;
    }
    let mut tz: i32 = 0;
    let mut digits = 0;
    while at < buf.len() && buf[at].is_ascii_digit() && digits < 4 {
        tz = tz * 10 + i32::from(buf[at] - b'0');
        at += 1;
        digits += 1;
    }
    (time, sign * tz)
}

/// Appends `value`, RFC 2047 quoted when it needs to be.
///
/// A value needs quoting if any byte has the high bit set, is ESC, or
/// begins an `=?` sequence. The quoted form is `=?<encoding>?q?<body>?=`
/// with non-ASCII, space, `=`, `?` and `_` bytes as `=HH`.
pub(crate) fn add_rfc2047(out: &mut Vec<u8>, value: &[u8], encoding: &str) {
    let needs_quoting = value.iter().enumerate().any(|(at, &b)| {
        b >= 0x80 || b == 0x1b || (b == b'=' && value.get(at + 1) == Some(&b'?'))
    });
    if !needs_quoting {
        out.extend_from_slice(value);
        return;
    }
    out.extend_from_slice(b"=?");
    out.extend_from_slice(encoding.as_bytes());
    out.extend_from_slice(b"?q?");
    for &b in value {
        if b >= 0x80 || b == b' ' || b == b'=' || b == b'?' || b == b'_' {
            out.extend_from_slice(format!("={b:02X}").as_bytes());
        } else {
            out.push(b);
        }
    }
    out.extend_from_slice(b"?=");
}

/// Returns the value of `key` among the header lines, if present.
pub(crate) fn get_header_value<'a>(buffer: &'a [u8], key: &str) -> Option<&'a [u8]> {
    let mut rest = buffer;
    while !rest.is_empty() {
        let line_len = rest.find_byte(b'\n').map_or(rest.len(), |at| at + 1);
        let (line, next) = rest.split_at(line_len);
        if line == b"\n" {
            return None;
        }
        let content = line.strip_suffix(b"\n").unwrap_or(line);
        if let Some(value) = content.strip_prefix(key.as_bytes())
            && let Some(value) = value.strip_prefix(b" ")
        {
            return Some(value);
        }
        rest = next;
    }
    None
}

/// Re-encodes the whole commit buffer to `output_encoding`, rewriting or
/// dropping the `encoding` header to match. Returns `None` when the
/// original buffer can be used as-is — either nothing to do, or the
/// declared charset is one this library cannot convert.
pub fn reencode_message(buffer: &[u8], output_encoding: &str) -> Option<Vec<u8>> {
    if output_encoding.is_empty() {
        return None;
    }
    let declared = get_header_value(buffer, "encoding");
    let use_encoding = declared.map_or(Cow::Borrowed("utf-8"), String::from_utf8_lossy);
    if use_encoding.eq_ignore_ascii_case(output_encoding) {
        // Same encoding; the header still wants rewriting when present.
        declared?;
        return Some(replace_encoding_header(buffer.to_vec(), output_encoding));
    }
    let transcoded = transcode(buffer, &use_encoding, output_encoding)?;
    Some(replace_encoding_header(transcoded, output_encoding))
}

/// Rewrites the `encoding` header to `output_encoding`, or removes the line
/// entirely when the output is UTF-8 (the default nobody declares).
pub(crate) fn replace_encoding_header(buffer: Vec<u8>, output_encoding: &str) -> Vec<u8> {
    let mut start = 0;
    let mut found = None;
    while start < buffer.len() {
        let rest = &buffer[start..];
        if rest.starts_with(b"\n") {
            break;
        }
        let line_end = rest.find_byte(b'\n').map_or(buffer.len(), |at| start + at + 1);
        if rest.starts_with(b"encoding ") {
            found = Some((start, line_end));
            break;
        }
        start = line_end;
    }
    let Some((line_start, line_end)) = found else {
        return buffer;
    };
    let mut buffer = buffer;
    if output_encoding.eq_ignore_ascii_case("utf-8") {
        buffer.splice(line_start..line_end, std::iter::empty());
    } else {
        let value_start = line_start + 9;
        let value_end = if buffer[line_end - 1] == b'\n' {
            line_end - 1
        } else {
            line_end
        };
        buffer.splice(value_start..value_end, output_encoding.bytes());
    }
    buffer
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Charset {
    Utf8,
    Ascii,
    Latin1,
}

fn charset(name: &str) -> Option<Charset> {
    match name.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Some(Charset::Utf8),
        "us-ascii" | "ascii" => Some(Charset::Ascii),
        "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Some(Charset::Latin1),
        _ => None,
    }
}

/// Converts between the charsets commits actually declare. `None` means the
/// conversion is unavailable and the caller keeps the original bytes.
fn transcode(input: &[u8], from: &str, to: &str) -> Option<Vec<u8>> {
    let from = charset(from)?;
    let to = charset(to)?;
    if from == to {
        return Some(input.to_vec());
    }
    match (from, to) {
        (Charset::Ascii, _) | (_, Charset::Ascii) => {
            input.iter().all(u8::is_ascii).then(|| input.to_vec())
        }
        (Charset::Latin1, Charset::Utf8) => {
            let mut out = Vec::with_capacity(input.len());
            for &b in input {
                if b < 0x80 {
                    out.push(b);
                } else {
                    // Latin-1 bytes are the first 256 Unicode code points.
                    out.push(0xc0 | (b >> 6));
                    out.push(0x80 | (b & 0x3f));
                }
            }
            Some(out)
        }
        (Charset::Utf8, Charset::Latin1) => {
            let text = std::str::from_utf8(input).ok()?;
            let mut out = Vec::with_capacity(input.len());
            for ch in text.chars() {
                let point = u32::from(ch);
                if point > 0xff {
                    return None;
                }
                out.push(point as u8);
            }
            Some(out)
        }
        _ => None,
    }
}
