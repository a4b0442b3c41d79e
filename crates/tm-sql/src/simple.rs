//! Terminator-character statement splitter.
//!
//! Used by every dialect except SQL Server: statements end at a `;` found in
//! plain code (outside comments, strings, quoted identifiers, and
//! dollar-quoted bodies).

use crate::builder::StatementBuilder;
use crate::lex::Scanner;
use crate::placeholder::Placeholders;
use crate::statement::SqlStatement;
use tm_db::DbKind;

/// Statement terminator for the simple dialects. CQL uses the same character.
const TERMINATOR: char = ';';

pub struct SimpleStatementBuilder {
    kind: DbKind,
}

impl SimpleStatementBuilder {
    pub fn new(kind: DbKind) -> Self {
        Self { kind }
    }

    /// Whether `sql` may run inside a transaction on this dialect.
    fn is_transactable(&self, sql: &str) -> bool {
        match self.kind {
            // CQL has no multi-statement transactions at all.
            DbKind::Cassandra => false,
            DbKind::PostgreSql | DbKind::CockroachDb => {
                let upper: String = sql
                    .to_uppercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                !(upper.contains("INDEX CONCURRENTLY")
                    || upper.starts_with("CREATE DATABASE")
                    || upper.starts_with("DROP DATABASE")
                    || upper.starts_with("VACUUM")
                    || (upper.starts_with("ALTER TYPE") && upper.contains(" ADD VALUE")))
            }
            DbKind::Sqlite | DbKind::MySql | DbKind::SqlServer => true,
        }
    }
}

impl StatementBuilder for SimpleStatementBuilder {
    fn build(&self, raw: &str, placeholders: &Placeholders) -> Vec<SqlStatement> {
        let prepared = placeholders.apply(raw);

        let mut splits = Vec::new();
        let mut scanner = Scanner::new(self.kind);
        scanner.feed(&prepared, |i, c| {
            if c == TERMINATOR {
                splits.push(i);
            }
        });

        let mut statements = Vec::new();
        let mut start = 0;
        for &pos in &splits {
            push_segment(&prepared, start..pos, self, &mut statements);
            start = pos + TERMINATOR.len_utf8();
        }
        // Trailing text without a terminator is still a statement.
        push_segment(&prepared, start..prepared.len(), self, &mut statements);
        statements
    }
}

fn push_segment(
    text: &str,
    range: std::ops::Range<usize>,
    builder: &SimpleStatementBuilder,
    out: &mut Vec<SqlStatement>,
) {
    let segment = &text[range.clone()];
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = segment.len() - segment.trim_start().len();
    let line = text[..range.start + lead].matches('\n').count() + 1;
    let transactable = builder.is_transactable(trimmed);
    out.push(SqlStatement::new(trimmed, line, transactable));
}

#[cfg(test)]
#[path = "simple_test.rs"]
mod tests;
