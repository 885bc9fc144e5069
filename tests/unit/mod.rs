pub mod annotation_tests;
pub mod config_tests;
pub mod error_tests;
pub mod expression_tests;
pub mod output_tests;
pub mod registry_tests;
pub mod scoring_tests;
