mod error_index_tests;
mod response_tests;
