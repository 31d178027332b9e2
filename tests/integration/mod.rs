//! Integration tests for the feza binary
//!
//! Each test drives the built binary inside a temporary git repository.

mod helpers;

mod test_build;
mod test_bump;
mod test_plan;
mod test_status;
