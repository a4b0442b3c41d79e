//! Executable statement unit.

/// One executable statement produced by a statement builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    /// Statement text, terminator stripped, placeholders substituted.
    pub sql: String,
    /// 1-based line of the statement's first non-whitespace character in the
    /// original script, for diagnostics.
    pub line: usize,
    /// False when the dialect forbids running this statement inside a
    /// transaction; the engine then executes it outside the surrounding
    /// transaction boundary.
    pub transactable: bool,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, line: usize, transactable: bool) -> Self {
        Self {
            sql: sql.into(),
            line,
            transactable,
        }
    }
}
