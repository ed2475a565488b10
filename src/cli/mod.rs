//! CLI surface and top-level dispatch
//!
//! Resolves the run configuration (flags over config file over built-in
//! defaults), drives the suite or test runner, and writes the rendered
//! report to the selected sink. Progress and verdict summaries go to
//! stderr so stdout can carry the report.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use colored::Colorize;

use crate::common::{Config, Result, RunConfig};
use crate::report;
use crate::runner::{Suite, SuiteRunner, Test, TestRunner};

/// Table-driven UI test runner for remote browser automation servers
#[derive(Parser, Debug)]
#[command(name = "tabletest", version)]
#[command(group(ArgGroup::new("target").required(true).args(["test", "testsuite"])))]
pub struct Args {
    /// Remote automation server hostname (default: localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// Remote automation server port (default: 4444)
    #[arg(long)]
    pub port: Option<u16>,

    /// Browser launch specifier (default: *opera)
    #[arg(long)]
    pub browser: Option<String>,

    /// Write the report to this file instead of standard output
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Base URL for relative URLs in the tests
    #[arg(long)]
    pub baseurl: Option<String>,

    /// Execute a single test file
    #[arg(long)]
    pub test: Option<PathBuf>,

    /// Execute a test suite file
    #[arg(long)]
    pub testsuite: Option<PathBuf>,

    /// Log each command before it is dispatched
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Args {
    /// Resolve the run configuration: flags win over the config file,
    /// the config file wins over built-in defaults
    pub fn resolve(&self, file: &Config) -> RunConfig {
        RunConfig {
            host: self.host.clone().unwrap_or_else(|| file.server.host.clone()),
            port: self.port.unwrap_or(file.server.port),
            browser: self
                .browser
                .clone()
                .unwrap_or_else(|| file.server.browser.clone()),
            base_url: self.baseurl.clone().or_else(|| file.run.baseurl.clone()),
            verbose: self.verbose,
        }
    }
}

/// Run the selected test or suite and emit the report
pub async fn run(args: Args) -> Result<()> {
    let config = args.resolve(&Config::load()?);
    crate::common::logging::init(config.verbose);

    let html = if let Some(path) = &args.testsuite {
        let suite = SuiteRunner::new(&config).run(path).await?;
        print_suite_summary(&suite);
        report::render(&report::from_suite(&suite, &config))
    } else if let Some(path) = &args.test {
        let test = TestRunner::new(&config).run(path, None).await?;
        print_test_summary(&test);
        report::render(&report::from_test(&test, &config))
    } else {
        // clap's ArgGroup guarantees one of the two is present
        unreachable!("either --test or --testsuite is required")
    };

    match &args.out {
        Some(path) => std::fs::write(path, html)?,
        None => print!("{html}"),
    }

    Ok(())
}

fn print_suite_summary(suite: &Suite) {
    for test in &suite.tests {
        print_test_summary(test);
    }
    if suite.passed() {
        eprintln!("{} {}", "✓".green().bold(), "Suite Passed".green().bold());
    } else {
        eprintln!("{} {}", "✗".red().bold(), "Suite Failed".red().bold());
    }
}

fn print_test_summary(test: &Test) {
    let location = test.file.display().to_string();
    if test.passed() {
        eprintln!("  {} {} {}", "✓".green(), test.anchor(), location.dimmed());
    } else {
        eprintln!("  {} {} {}", "✗".red(), test.anchor(), location.dimmed());
    }
}
