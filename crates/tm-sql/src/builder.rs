//! Statement builder trait and dialect factory.

use crate::batch::BatchStatementBuilder;
use crate::placeholder::Placeholders;
use crate::simple::SimpleStatementBuilder;
use crate::statement::SqlStatement;
use tm_db::DbKind;

/// Splits one migration script into executable statements.
///
/// An empty script yields zero statements; that is not an error, the
/// orchestrator treats it as a no-op migration.
pub trait StatementBuilder: Send + Sync {
    fn build(&self, raw: &str, placeholders: &Placeholders) -> Vec<SqlStatement>;
}

/// Resolve the statement builder for a dialect.
pub fn builder_for(kind: DbKind) -> Box<dyn StatementBuilder> {
    match kind {
        DbKind::SqlServer => Box::new(BatchStatementBuilder::new()),
        _ => Box::new(SimpleStatementBuilder::new(kind)),
    }
}
