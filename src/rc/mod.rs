//! Remote-control protocol client
//!
//! The remote browser-automation server speaks a plain-text HTTP command
//! protocol: commands are POSTed as form parameters and answered with a
//! body whose `OK` prefix signals success. [`Session`] owns one browser
//! session on such a server.

pub mod session;
pub mod wire;

pub use session::Session;
