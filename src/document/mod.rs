//! Document Parser boundary
//!
//! Reduces a markup document to the tables the runners care about. Test
//! and suite files are authored as permissive HTML; documents that lead
//! with an XML declaration go through a strict XML reader instead.

pub mod parser;
pub mod table;

pub use parser::{parse, parse_file, ParserKind};
pub use table::{collapse_text, Cell, Link, Row, Table, TableDoc};
