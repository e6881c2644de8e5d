mod common;
mod sync_tests;
