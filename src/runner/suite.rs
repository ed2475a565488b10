//! Suite execution
//!
//! A suite document is an index table whose rows link to test documents.
//! Every referenced test runs, in document order, each against its own
//! fresh session; the suite never aborts early on a failing test.

use std::path::{Path, PathBuf};

use crate::common::{Error, Result, RunConfig};
use crate::document;

use super::test::{Test, TestRunner};

/// A reference row from the suite index table
#[derive(Debug, Clone)]
pub struct TestRef {
    /// Link text; becomes the test's report anchor
    pub label: String,
    /// Link target resolved against the suite document's directory
    pub file: PathBuf,
}

/// One executed suite
#[derive(Debug)]
pub struct Suite {
    /// Source document
    pub file: PathBuf,
    /// Header row text of the index table
    pub name: String,
    /// Executed tests, in index order
    pub tests: Vec<Test>,
}

impl Suite {
    /// Overall verdict: every test passed (vacuously true with no tests)
    pub fn passed(&self) -> bool {
        self.tests.iter().all(Test::passed)
    }
}

/// Drives every test referenced by a suite document
pub struct SuiteRunner<'a> {
    config: &'a RunConfig,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Run the suite document at `file`
    pub async fn run(&self, file: &Path) -> Result<Suite> {
        tracing::info!(
            "Running test suite {} against {}:{} with {}",
            file.display(),
            self.config.host,
            self.config.port,
            self.config.browser
        );

        let doc = document::parse_file(file)?;
        let table = doc
            .first_table()
            .ok_or_else(|| Error::document_parse(file.display(), "no index table"))?;
        let header = table
            .rows
            .first()
            .ok_or_else(|| Error::document_parse(file.display(), "index table is empty"))?;
        let name = header.display_text();

        let suite_dir = file.parent().unwrap_or_else(|| Path::new("."));
        let refs = table.rows[1..]
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let link = row
                    .cells
                    .first()
                    .and_then(|cell| cell.link.clone())
                    .ok_or_else(|| {
                        Error::document_parse(
                            file.display(),
                            format!("index row {} has no test link", i + 1),
                        )
                    })?;
                Ok(TestRef {
                    label: link.label,
                    file: suite_dir.join(link.href),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tests = Vec::with_capacity(refs.len());
        for test_ref in refs {
            let runner = TestRunner::new(self.config);
            let test = runner
                .run(&test_ref.file, Some(test_ref.label.clone()))
                .await?;
            tests.push(test);
        }

        Ok(Suite {
            file: file.to_path_buf(),
            name,
            tests,
        })
    }
}
