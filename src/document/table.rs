//! Normalized table model
//!
//! Both parser strategies reduce a document to this shape; the runners
//! never see the underlying markup tree.

/// A parsed markup document reduced to its tables
#[derive(Debug, Default)]
pub struct TableDoc {
    /// Target of the document's first `<link href>` element, if any.
    /// Test files use it to declare their base URL.
    pub base_href: Option<String>,
    /// Tables in document order
    pub tables: Vec<Table>,
}

impl TableDoc {
    /// The first table of the document, which holds the command or index rows
    pub fn first_table(&self) -> Option<&Table> {
        self.tables.first()
    }
}

/// One table: an ordered sequence of rows
#[derive(Debug, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// One table row: an ordered sequence of cells
#[derive(Debug, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    /// Row text for display purposes (header rows, suite names), with all
    /// whitespace runs collapsed
    pub fn display_text(&self) -> String {
        let joined = self
            .cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        joined.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// One table cell: its text content plus the first contained link, if any
#[derive(Debug, Default)]
pub struct Cell {
    pub text: String,
    pub link: Option<Link>,
}

/// An anchor inside a cell; suite index rows use these to reference tests
#[derive(Debug, Clone)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// Collapse cell text the way the table format expects: runs of ordinary
/// spaces become one, then non-breaking spaces become ordinary ones, then
/// the result is trimmed. The order matters: a run of non-breaking spaces
/// survives as multiple ordinary spaces.
pub fn collapse_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(if ch == '\u{00A0}' { ' ' } else { ch });
            last_was_space = false;
        }
    }
    out.trim().to_string()
}
