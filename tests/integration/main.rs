//! Integration tests for bonjourr-quotes
//!
//! These tests use wiremock to stand in for the upstream quote APIs and
//! tempfile for the CSV and summary files.

mod harvest_tests;
mod pipeline_tests;
