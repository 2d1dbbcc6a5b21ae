//! Console and CLI against a mocked skill service over HTTP.

mod cli_tests;
mod console_tests;
mod fixture;
