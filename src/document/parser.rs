//! Markup parsing strategies
//!
//! Test documents are usually permissive HTML and go through the tolerant
//! parser. Documents that lead with an XML declaration bypass it and are
//! read strictly. Both strategies are statically linked; the choice is
//! made once per document from its first bytes.

use std::path::Path;

use scraper::{Html, Selector};

use crate::common::{Error, Result};

use super::table::{Cell, Link, Row, Table, TableDoc};

/// Which parser a document goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// Permissive HTML parsing
    TolerantHtml,
    /// Strict XML parsing for XML-declared documents
    StrictXml,
}

/// Decide the parsing strategy from the document's leading bytes
pub fn detect(source: &str) -> ParserKind {
    if source.trim_start().starts_with("<?xml") {
        ParserKind::StrictXml
    } else {
        ParserKind::TolerantHtml
    }
}

/// Read and parse a document from disk
pub fn parse_file(path: &Path) -> Result<TableDoc> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    parse(&source, path)
}

/// Parse a document; `origin` only labels errors
pub fn parse(source: &str, origin: &Path) -> Result<TableDoc> {
    match detect(source) {
        ParserKind::TolerantHtml => Ok(parse_html(source)),
        ParserKind::StrictXml => parse_xml(source, origin),
    }
}

fn parse_html(source: &str) -> TableDoc {
    // Static selectors cannot fail to parse
    let table_sel = Selector::parse("table").expect("static selector");
    let row_sel = Selector::parse("tr").expect("static selector");
    let cell_sel = Selector::parse("td, th").expect("static selector");
    let anchor_sel = Selector::parse("a").expect("static selector");
    let base_sel = Selector::parse("link[href]").expect("static selector");

    let html = Html::parse_document(source);

    let base_href = html
        .select(&base_sel)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string);

    let mut tables = Vec::new();
    for table in html.select(&table_sel) {
        let mut rows = Vec::new();
        for tr in table.select(&row_sel) {
            let mut cells = Vec::new();
            for td in tr.select(&cell_sel) {
                let link = td.select(&anchor_sel).next().map(|a| Link {
                    label: a.text().collect::<String>().trim().to_string(),
                    href: a.value().attr("href").unwrap_or_default().to_string(),
                });
                cells.push(Cell {
                    text: td.text().collect::<String>(),
                    link,
                });
            }
            // Rows without cells carry nothing the runners can use
            if !cells.is_empty() {
                rows.push(Row { cells });
            }
        }
        tables.push(Table { rows });
    }

    TableDoc { base_href, tables }
}

fn parse_xml(source: &str, origin: &Path) -> Result<TableDoc> {
    let doc = roxmltree::Document::parse(source)
        .map_err(|e| Error::document_parse(origin.display(), e.to_string()))?;

    let base_href = doc
        .descendants()
        .find(|n| n.tag_name().name() == "link")
        .and_then(|n| n.attribute("href"))
        .map(str::to_string);

    let mut tables = Vec::new();
    for table in doc
        .descendants()
        .filter(|n| n.tag_name().name() == "table")
    {
        let mut rows = Vec::new();
        for tr in table.descendants().filter(|n| n.tag_name().name() == "tr") {
            let mut cells = Vec::new();
            for td in tr
                .descendants()
                .filter(|n| n.tag_name().name() == "td" || n.tag_name().name() == "th")
            {
                let link = td
                    .descendants()
                    .find(|n| n.tag_name().name() == "a")
                    .map(|a| Link {
                        label: node_text(a).trim().to_string(),
                        href: a.attribute("href").unwrap_or_default().to_string(),
                    });
                cells.push(Cell {
                    text: node_text(td),
                    link,
                });
            }
            if !cells.is_empty() {
                rows.push(Row { cells });
            }
        }
        tables.push(Table { rows });
    }

    Ok(TableDoc { base_href, tables })
}

fn node_text(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants().filter_map(|n| n.text()).collect()
}
