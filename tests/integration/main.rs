//! Integration tests for Adsweep
//!
//! These tests use wiremock to serve a small classified-ad site and run
//! the whole pipeline against it.

mod pipeline_tests;
