//! Statements produced by the splitter.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One independently executable SQL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Statement {
    /// 1-based position among the statements emitted for one file.
    pub ordinal: usize,
    /// 1-based line of the source text where the statement begins.
    pub line: usize,
    /// Statement text, trimmed, without the terminating `;`.
    pub sql: String,
}

impl Statement {
    /// Single-line preview of the statement, cut at `max_chars` characters.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.sql, max_chars)
    }
}

/// Collapse whitespace runs to single spaces and cut at `max_chars` characters.
#[must_use]
pub fn preview(sql: &str, max_chars: usize) -> String {
    let one_line = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if one_line.chars().count() > max_chars {
        let cut: String = one_line.chars().take(max_chars).collect();
        format!("{cut}…")
    } else {
        one_line
    }
}

/// How SQL text is cut into statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SplitMode {
    /// Split on every `;`, drop `--` comment lines, skip dollar-quoted blocks.
    #[default]
    Naive,
    /// Lex strings, comments and dollar quotes; split only on top-level `;`.
    QuoteAware,
}

impl SplitMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::QuoteAware => "quote-aware",
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the splitter did not emit a piece of text as a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A dollar-quoted procedural block (`DO $$ … $$`) the naive splitter cannot cut safely.
    ProceduralBlock,
    /// `BEGIN` / `COMMIT` / `ROLLBACK`: every statement is its own RPC call.
    TransactionControl,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProceduralBlock => "procedural_block",
            Self::TransactionControl => "transaction_control",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text the splitter recognised and deliberately left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkippedBlock {
    pub line: usize,
    pub reason: SkipReason,
    pub text: String,
}

/// Splitter output: the statements to run, in file order, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SplitOutput {
    pub statements: Vec<Statement>,
    pub skipped: Vec<SkippedBlock>,
}

impl SplitOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.skipped.is_empty()
    }
}

/// One migration file as printed by `latsdb split --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SplitFile {
    pub path: String,
    pub mode: SplitMode,
    #[serde(flatten)]
    pub output: SplitOutput,
}
