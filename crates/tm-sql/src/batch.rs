//! SQL Server `GO` batch splitter.
//!
//! `GO` is a client-side batch delimiter, not T-SQL: it only counts when a
//! line consists solely of the token (case-insensitive), optionally followed
//! by a repeat count and/or a trailing line comment. `GO` inside block
//! comments, line comments, strings, or ordinary statement text never splits.

use crate::builder::StatementBuilder;
use crate::lex::Scanner;
use crate::placeholder::Placeholders;
use crate::statement::SqlStatement;
use regex::Regex;
use std::sync::OnceLock;
use tm_db::DbKind;

fn go_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Anchored line form: optional leading whitespace, GO, optional
        // repeat count, optional trailing line comment.
        Regex::new(r"(?i)^[ \t]*GO(?:[ \t]+(\d+))?[ \t]*(?:--.*)?$").unwrap()
    })
}

#[derive(Default)]
pub struct BatchStatementBuilder;

impl BatchStatementBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl StatementBuilder for BatchStatementBuilder {
    fn build(&self, raw: &str, placeholders: &Placeholders) -> Vec<SqlStatement> {
        let prepared = placeholders.apply(raw);

        let mut statements = Vec::new();
        let mut scanner = Scanner::new(DbKind::SqlServer);
        let mut current = String::new();
        let mut segment_line: Option<usize> = None;

        for (idx, line) in prepared.lines().enumerate() {
            // A GO line only delimits when the scanner sits in plain code at
            // the start of the line; inside a block comment or a string that
            // spans lines it is ordinary content.
            if scanner.is_plain() {
                if let Some(caps) = go_regex().captures(line) {
                    let count: usize = caps
                        .get(1)
                        .and_then(|m| m.as_str().parse().ok())
                        .unwrap_or(1);
                    flush(&mut current, segment_line.take(), count, &mut statements);
                    continue;
                }
            }
            scanner.feed(line, |_, _| {});
            scanner.end_line();
            if segment_line.is_none() && !line.trim().is_empty() {
                segment_line = Some(idx + 1);
            }
            current.push_str(line);
            current.push('\n');
        }
        flush(&mut current, segment_line, 1, &mut statements);
        statements
    }
}

/// Emit the accumulated segment `count` times (a `GO n` repeat), discarding
/// empty segments. Every SQL Server batch is transactable.
fn flush(current: &mut String, line: Option<usize>, count: usize, out: &mut Vec<SqlStatement>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        let line = line.unwrap_or(1);
        for _ in 0..count {
            out.push(SqlStatement::new(trimmed, line, true));
        }
    }
    current.clear();
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
