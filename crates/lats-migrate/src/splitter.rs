//! SQL text → ordered statements.
//!
//! Two strategies, selected by [`SplitMode`]:
//!
//! - **Naive**: drop `--` comment lines, cut on every `;`. Dollar-quoted
//!   procedural blocks cannot survive that cut, so they are detected by
//!   counting `$$` markers and reported as skipped instead of being sent
//!   as broken fragments.
//! - **Quote-aware**: a small lexer that tracks string literals, quoted
//!   identifiers, comments and `$tag$` bodies and only cuts on top-level `;`.
//!
//! Both strategies report bare transaction control (`BEGIN`, `COMMIT`, …) as
//! skipped: each statement runs in its own request, so a transaction cannot
//! span statements.

use lats_core::{SkipReason, SkippedBlock, SplitMode, SplitOutput, Statement};

/// A trimmed piece of text between separators, with the line it starts on.
#[derive(Debug)]
struct Segment {
    line: usize,
    text: String,
    procedural: bool,
}

/// Split `text` into statements. Never fails; malformed SQL is the backend's
/// problem.
#[must_use]
pub fn split(text: &str, mode: SplitMode) -> SplitOutput {
    let segments = match mode {
        SplitMode::Naive => group_procedural(naive_segments(text)),
        SplitMode::QuoteAware => lex_segments(text),
    };
    assemble(segments)
}

fn assemble(segments: Vec<Segment>) -> SplitOutput {
    let mut output = SplitOutput::default();
    for segment in segments {
        let reason = if segment.procedural {
            Some(SkipReason::ProceduralBlock)
        } else if is_transaction_control(&segment.text) {
            Some(SkipReason::TransactionControl)
        } else {
            None
        };

        match reason {
            Some(reason) => output.skipped.push(SkippedBlock {
                line: segment.line,
                reason,
                text: segment.text,
            }),
            None => output.statements.push(Statement {
                ordinal: output.statements.len() + 1,
                line: segment.line,
                sql: segment.text,
            }),
        }
    }
    output
}

fn is_transaction_control(sql: &str) -> bool {
    let normalized = sql
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    matches!(
        normalized.as_str(),
        "BEGIN"
            | "BEGIN TRANSACTION"
            | "BEGIN WORK"
            | "START TRANSACTION"
            | "COMMIT"
            | "COMMIT TRANSACTION"
            | "COMMIT WORK"
            | "END"
            | "END TRANSACTION"
            | "ROLLBACK"
            | "ROLLBACK TRANSACTION"
            | "ROLLBACK WORK"
    )
}

fn flush(segments: &mut Vec<Segment>, current: &mut String, start: &mut Option<usize>) {
    if let Some(line) = start.take() {
        let text = current.trim();
        if !text.is_empty() && !is_comment_only(text) {
            segments.push(Segment {
                line,
                text: text.to_string(),
                procedural: false,
            });
        }
    }
    current.clear();
}

/// True when every non-blank line is a `--` comment, e.g. the tail of
/// `SELECT 1; -- done`.
fn is_comment_only(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| line.starts_with("--"))
}

// ---------------------------------------------------------------------------
// Naive
// ---------------------------------------------------------------------------

fn naive_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        // A `-- note` left after the previous `;` does not open a statement.
        if start.is_some() && is_comment_only(&current) {
            current.clear();
            start = None;
        }
        if start.is_some() {
            current.push('\n');
        }
        for ch in line.chars() {
            if ch == ';' {
                flush(&mut segments, &mut current, &mut start);
                continue;
            }
            if start.is_none() && !ch.is_whitespace() {
                start = Some(index + 1);
            }
            if start.is_some() {
                current.push(ch);
            }
        }
    }
    flush(&mut segments, &mut current, &mut start);
    segments
}

fn dollar_markers(text: &str) -> usize {
    text.matches("$$").count()
}

fn starts_do_block(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some('D' | 'd'), Some('O' | 'o'), Some(c)) if c.is_whitespace() || c == '$'
    )
}

/// Merge a segment with an odd number of `$$` markers with the segments that
/// follow until the markers balance, and mark `DO` blocks, so that neither is
/// sent as a statement.
fn group_procedural(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    let mut iter = segments.into_iter();

    while let Some(mut segment) = iter.next() {
        let mut open = dollar_markers(&segment.text) % 2 == 1;
        let is_do = starts_do_block(&segment.text) && segment.text.contains('$');
        if !open && !is_do {
            out.push(segment);
            continue;
        }
        while open {
            let Some(next) = iter.next() else {
                break;
            };
            open ^= dollar_markers(&next.text) % 2 == 1;
            segment.text.push_str(";\n");
            segment.text.push_str(&next.text);
        }
        segment.procedural = true;
        out.push(segment);
    }
    out
}

// ---------------------------------------------------------------------------
// Quote-aware
// ---------------------------------------------------------------------------

fn lex_segments(text: &str) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let end = match ch {
            ';' => {
                flush(&mut segments, &mut current, &mut start);
                i += 1;
                continue;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                // Comments only count once a statement has started.
                let end = chars[i..]
                    .iter()
                    .position(|&c| c == '\n')
                    .map_or(chars.len(), |p| i + p);
                if start.is_some() {
                    current.extend(&chars[i..end]);
                }
                i = end;
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let end = find_seq(&chars, i + 2, &['*', '/']).map_or(chars.len(), |p| p + 2);
                if start.is_some() {
                    current.extend(&chars[i..end]);
                }
                line += count_newlines(&chars[i..end]);
                i = end;
                continue;
            }
            '\'' | '"' => quoted_end(&chars, i, ch),
            '$' => match dollar_tag_len(&chars, i) {
                Some(tag_len) => {
                    let tag = &chars[i..i + tag_len];
                    find_seq(&chars, i + tag_len, tag).map_or(chars.len(), |p| p + tag_len)
                }
                None => i + 1,
            },
            _ => i + 1,
        };

        let token = &chars[i..end];
        if start.is_none() && token.iter().any(|c| !c.is_whitespace()) {
            start = Some(line);
        }
        if start.is_some() {
            current.extend(token);
        }
        line += count_newlines(token);
        i = end;
    }
    flush(&mut segments, &mut current, &mut start);
    segments
}

/// Index just past the closing quote of the literal opened at `open`.
/// A doubled quote character is an escaped quote.
fn quoted_end(chars: &[char], open: usize, quote: char) -> usize {
    let mut j = open + 1;
    while j < chars.len() {
        if chars[j] == quote {
            if chars.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    chars.len()
}

/// Length of the `$tag$` opener at `at`, if one starts there.
fn dollar_tag_len(chars: &[char], at: usize) -> Option<usize> {
    if at > 0 && (chars[at - 1].is_alphanumeric() || chars[at - 1] == '_') {
        return None;
    }
    let mut j = at + 1;
    match chars.get(j) {
        Some('$') => return Some(2),
        Some(c) if c.is_alphabetic() || *c == '_' => {}
        _ => return None,
    }
    while chars.get(j).is_some_and(|c| c.is_alphanumeric() || *c == '_') {
        j += 1;
    }
    (chars.get(j) == Some(&'$')).then_some(j - at + 1)
}

fn find_seq(chars: &[char], from: usize, seq: &[char]) -> Option<usize> {
    if chars.len() < seq.len() {
        return None;
    }
    (from..=chars.len() - seq.len()).find(|&p| chars[p..p + seq.len()] == *seq)
}

fn count_newlines(chars: &[char]) -> usize {
    chars.iter().filter(|&&c| c == '\n').count()
}
