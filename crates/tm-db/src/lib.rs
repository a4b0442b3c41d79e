//! tm-db - Database abstraction layer for Tidemark
//!
//! This crate defines the vendor-neutral [`Connection`] capability trait the
//! engine runs against, the [`DbKind`] tag that keys dialect resolution, and
//! the parameter/row value model. Driver acquisition is the embedding
//! application's job: it implements `Connection` over whatever native driver
//! it resolves, and hands the engine the open handle plus its kind tag.

pub mod error;
pub mod kind;
pub mod traits;
pub mod value;

pub use error::{DbError, DbResult};
pub use kind::DbKind;
pub use traits::Connection;
pub use value::{Row, Value};
