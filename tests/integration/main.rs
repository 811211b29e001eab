//! Integration test entry point

mod crawl_tests;
mod output_tests;
