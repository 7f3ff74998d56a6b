//! Expectation table loaders

mod json_table;

pub use json_table::{load_table, parse_table};
