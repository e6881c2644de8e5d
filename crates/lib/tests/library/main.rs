mod hooks_tests;
mod orphan_tests;
mod sync_tests;
