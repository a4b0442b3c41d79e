//! tm-sql - Statement splitting for Tidemark
//!
//! Turns one migration's raw text plus a placeholder map into an ordered
//! sequence of executable statements. This is deliberately not a SQL parser:
//! just enough lexical awareness to find terminators outside comments and
//! strings, and to locate the SQL Server `GO` batch delimiter.

pub mod batch;
pub mod builder;
pub(crate) mod lex;
pub mod placeholder;
pub mod quote;
pub mod simple;
pub mod statement;

pub use batch::BatchStatementBuilder;
pub use builder::{builder_for, StatementBuilder};
pub use placeholder::Placeholders;
pub use quote::quote_ident;
pub use simple::SimpleStatementBuilder;
pub use statement::SqlStatement;
