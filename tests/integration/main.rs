//! Dispatch-engine integration tests.
//!
//! Runs on host targets only; the mock adapter stands in for real link
//! hardware.

#![cfg(not(target_os = "espidf"))]

mod engine_tests;
mod mock_link;
