//! Test execution engine
//!
//! Rows are normalized into canonical commands, executed one at a time
//! against a remote session, and aggregated into test and suite records
//! with pass/fail verdicts.

pub mod normalize;
pub mod step;
pub mod suite;

pub use step::{Command, CommandTarget};
pub use suite::{Suite, SuiteRunner, TestRef};
pub use test::{Test, TestRunner, TestState};
