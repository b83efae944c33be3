//! Comment preservation
//!
//! The YAML parser discards comments, so they are captured from the raw
//! text separately and woven back into freshly serialized output.
//!
//! Comment lines, blank lines and document markers are grouped into blocks.
//! Each block is anchored to the content line that follows it, identified by
//! its trimmed text (quotes removed) plus how many identical lines came
//! before it. The first line of a sequence item is additionally identified
//! by the text of the whole item, so comments travel with entries that get
//! reordered, and by its `description` line, so they still travel with an
//! entry whose other fields were rewritten. End-of-line comments are anchored
//! to the line they trail. A block whose anchor vanished goes back to its
//! original line number.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Key naming a task entry, stable across script rewrites
const IDENTITY_KEY: &str = "description:";

/// Indicator ending a line that opens a literal or folded block scalar
static BLOCK_SCALAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|:\s+|-\s+)[|>][0-9+-]*$").expect("block scalar pattern is valid")
});

/// Identity of a content line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Anchor {
    key: String,
    occurrence: usize,
}

/// Where a comment belongs: a sequence item when possible, else a line
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineRef {
    line: Anchor,
    item: Option<Anchor>,
    identity: Option<Anchor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CommentBlock {
    lines: Vec<String>,
    anchor: Option<LineRef>,
    line_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrailingComment {
    anchor: LineRef,
    suffix: String,
}

/// How precisely a comment was placed, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Match {
    Item,
    Identity,
    Line,
}

/// Positions of the content lines of a rendered text
#[derive(Default)]
struct Positions<'a> {
    lines: HashMap<&'a Anchor, usize>,
    items: HashMap<&'a Anchor, usize>,
    identities: HashMap<&'a Anchor, usize>,
}

impl Positions<'_> {
    fn find(&self, target: &LineRef) -> Option<(usize, Match)> {
        if let Some(index) = lookup(target.item.as_ref(), &self.items) {
            return Some((index, Match::Item));
        }
        if let Some(index) = lookup(target.identity.as_ref(), &self.identities) {
            return Some((index, Match::Identity));
        }
        self.lines
            .get(&target.line)
            .map(|index| (*index, Match::Line))
    }
}

fn lookup(anchor: Option<&Anchor>, positions: &HashMap<&Anchor, usize>) -> Option<usize> {
    anchor.and_then(|anchor| positions.get(anchor)).copied()
}

/// Comments captured from one document text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentLedger {
    blocks: Vec<CommentBlock>,
    trailing: Vec<TrailingComment>,
}

impl CommentLedger {
    /// Record the comments of a document text
    #[must_use]
    pub fn collect(text: &str) -> Self {
        let mut ledger = Self::default();
        let mut pending: Vec<String> = Vec::new();
        let mut pending_start = 0;

        for (index, line) in scan(text).into_iter().enumerate() {
            match line {
                ScannedLine::Ledger(raw) => {
                    if pending.is_empty() {
                        pending_start = index;
                    }
                    pending.push(raw.to_string());
                }
                ScannedLine::Scalar(_) => {}
                ScannedLine::Content {
                    anchor,
                    item,
                    identity,
                    suffix,
                    ..
                } => {
                    let target = LineRef {
                        line: anchor,
                        item,
                        identity,
                    };
                    if !pending.is_empty() {
                        ledger.blocks.push(CommentBlock {
                            lines: std::mem::take(&mut pending),
                            anchor: Some(target.clone()),
                            line_index: pending_start,
                        });
                    }
                    if let Some(suffix) = suffix {
                        ledger.trailing.push(TrailingComment {
                            anchor: target,
                            suffix: suffix.to_string(),
                        });
                    }
                }
            }
        }

        if !pending.is_empty() {
            ledger.blocks.push(CommentBlock {
                lines: pending,
                anchor: None,
                line_index: pending_start,
            });
        }

        ledger
    }

    /// Weave the captured comments into serialized text
    #[must_use]
    pub fn inject(&self, rendered: &str) -> String {
        let scanned = scan(rendered);

        let mut positions = Positions::default();
        for (index, line) in scanned.iter().enumerate() {
            if let ScannedLine::Content {
                anchor,
                item,
                identity,
                ..
            } = line
            {
                positions.lines.insert(anchor, index);
                if let Some(item) = item {
                    positions.items.insert(item, index);
                }
                if let Some(identity) = identity {
                    positions.identities.insert(identity, index);
                }
            }
        }

        let mut before: Vec<Vec<&str>> = vec![Vec::new(); scanned.len()];
        let mut suffixes: Vec<Option<&str>> = vec![None; scanned.len()];
        let mut orphans: Vec<&CommentBlock> = Vec::new();
        let mut tail: Vec<&str> = Vec::new();

        for block in &self.blocks {
            let lines = block.lines.iter().map(String::as_str);
            match &block.anchor {
                None => tail.extend(lines),
                Some(anchor) => match positions.find(anchor) {
                    Some((index, _)) => before[index].extend(lines),
                    None => orphans.push(block),
                },
            }
        }

        let mut placed: Vec<(usize, Match, &str)> = Vec::new();
        for comment in &self.trailing {
            match positions.find(&comment.anchor) {
                Some((index, precision)) => {
                    placed.push((index, precision, comment.suffix.as_str()));
                }
                None => tracing::debug!(
                    "Dropping end-of-line comment '{}': its line is gone",
                    comment.suffix.trim()
                ),
            }
        }
        // A line keeps at most one end-of-line comment, the best placed one
        placed.sort_by_key(|(_, precision, _)| *precision);
        for (index, _, suffix) in placed {
            match suffixes[index] {
                None => suffixes[index] = Some(suffix),
                Some(kept) => tracing::debug!(
                    "Dropping end-of-line comment '{}': its line already carries '{}'",
                    suffix.trim(),
                    kept.trim()
                ),
            }
        }

        let mut output: Vec<String> = Vec::with_capacity(scanned.len());
        for (index, line) in scanned.iter().enumerate() {
            output.extend(before[index].iter().map(|l| (*l).to_string()));
            let text = line.text();
            match suffixes[index] {
                Some(suffix) => output.push(format!("{text}{suffix}")),
                None => output.push(text.to_string()),
            }
        }

        orphans.sort_by_key(|block| block.line_index);
        for block in orphans {
            let at = block.line_index.min(output.len());
            for (offset, line) in block.lines.iter().enumerate() {
                output.insert(at + offset, line.clone());
            }
        }

        output.extend(tail.into_iter().map(str::to_string));

        if output.is_empty() {
            return String::new();
        }
        let mut text = output.join("\n");
        text.push('\n');
        text
    }
}

#[derive(Debug)]
enum ScannedLine<'a> {
    /// Comment, blank line or document marker
    Ledger(&'a str),
    /// Line inside a block scalar
    Scalar(&'a str),
    /// Structural content
    Content {
        text: &'a str,
        anchor: Anchor,
        item: Option<Anchor>,
        identity: Option<Anchor>,
        suffix: Option<&'a str>,
    },
}

impl ScannedLine<'_> {
    fn text(&self) -> &str {
        match self {
            Self::Ledger(text) | Self::Scalar(text) => text,
            Self::Content { text, suffix, .. } => {
                let end = text.len() - suffix.map_or(0, str::len);
                &text[..end]
            }
        }
    }
}

/// Classify every line of a document text
fn scan(text: &str) -> Vec<ScannedLine<'_>> {
    let mut lines: Vec<ScannedLine<'_>> = Vec::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut block_indent: Option<usize> = None;
    let mut blank_run: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let trimmed = raw.trim();

        if let Some(indent) = block_indent {
            if trimmed.is_empty() {
                blank_run.push(raw);
                continue;
            }
            if indentation(raw) > indent {
                lines.extend(blank_run.drain(..).map(ScannedLine::Scalar));
                lines.push(ScannedLine::Scalar(raw));
                continue;
            }
            block_indent = None;
            lines.extend(blank_run.drain(..).map(ScannedLine::Ledger));
        }

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" {
            lines.push(ScannedLine::Ledger(raw));
            continue;
        }

        let (content, suffix) = split_trailing_comment(raw);
        let key = anchor_key(content);
        let occurrence = occurrences.entry(key.clone()).or_insert(0);
        let anchor = Anchor {
            key,
            occurrence: *occurrence,
        };
        *occurrence += 1;

        if BLOCK_SCALAR.is_match(content.trim()) {
            block_indent = Some(indentation(raw));
        }

        lines.push(ScannedLine::Content {
            text: raw,
            anchor,
            item: None,
            identity: None,
            suffix,
        });
    }

    lines.extend(blank_run.into_iter().map(ScannedLine::Ledger));
    assign_item_anchors(&mut lines);
    lines
}

/// Identify the first line of every sequence item by the item's full text
/// and by its `description` line
fn assign_item_anchors(lines: &mut [ScannedLine<'_>]) {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut identity_occurrences: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<(usize, Anchor, Option<Anchor>)> = Vec::new();

    for (start, line) in lines.iter().enumerate() {
        let ScannedLine::Content { text, anchor, .. } = line else {
            continue;
        };
        let trimmed = text.trim_start();
        if !(trimmed.starts_with("- ") || trimmed == "-") {
            continue;
        }

        let indent = indentation(text);
        let mut parts: Vec<&str> = vec![anchor.key.as_str()];
        let first_key = anchor.key.trim_start_matches('-').trim_start();
        let mut identity = first_key.starts_with(IDENTITY_KEY).then_some(first_key);
        let mut fields: Option<usize> = None;
        for next in &lines[start + 1..] {
            match next {
                ScannedLine::Content { text, anchor, .. } => {
                    let next_indent = indentation(text);
                    if next_indent <= indent {
                        break;
                    }
                    let field_indent = *fields.get_or_insert(next_indent);
                    if identity.is_none()
                        && next_indent == field_indent
                        && anchor.key.starts_with(IDENTITY_KEY)
                    {
                        identity = Some(anchor.key.as_str());
                    }
                    parts.push(anchor.key.as_str());
                }
                ScannedLine::Scalar(text) => parts.push(text.trim()),
                ScannedLine::Ledger(_) => {}
            }
        }

        let identity = identity.map(|key| {
            let occurrence = identity_occurrences.entry(key.to_string()).or_insert(0);
            let anchor = Anchor {
                key: key.to_string(),
                occurrence: *occurrence,
            };
            *occurrence += 1;
            anchor
        });

        let key = parts.join("\n");
        let occurrence = occurrences.entry(key.clone()).or_insert(0);
        let item = Anchor {
            key,
            occurrence: *occurrence,
        };
        *occurrence += 1;
        items.push((start, item, identity));
    }

    for (index, anchor, description) in items {
        if let ScannedLine::Content { item, identity, .. } = &mut lines[index] {
            *item = Some(anchor);
            *identity = description;
        }
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Normalized text identifying a content line
fn anchor_key(content: &str) -> String {
    content.trim().chars().filter(|c| *c != '\'' && *c != '"').collect()
}

/// Split `key: value  # note` into content and `  # note`
///
/// A `#` only starts a comment outside quotes and after whitespace.
fn split_trailing_comment(line: &str) -> (&str, Option<&str>) {
    #[derive(Clone, Copy, PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let bytes = line.as_bytes();
    let mut state = Quote::None;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        let prev = if i == 0 { b' ' } else { bytes[i - 1] };

        match state {
            Quote::Single => {
                if byte == b'\'' {
                    if bytes.get(i + 1) == Some(&b'\'') {
                        i += 1;
                    } else {
                        state = Quote::None;
                    }
                }
            }
            Quote::Double => match byte {
                b'\\' => i += 1,
                b'"' => state = Quote::None,
                _ => {}
            },
            Quote::None => {
                let opens = prev.is_ascii_whitespace() || matches!(prev, b'[' | b'{' | b',');
                match byte {
                    b'\'' if opens => state = Quote::Single,
                    b'"' if opens => state = Quote::Double,
                    b'#' if prev.is_ascii_whitespace() && i > 0 => {
                        let start = line[..i].trim_end().len();
                        return (&line[..start], Some(&line[start..]));
                    }
                    _ => {}
                }
            }
        }
        i += 1;
    }

    (line, None)
}
