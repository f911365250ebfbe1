pub mod accordion;
pub mod chart;
pub mod cli;
pub mod config;
pub mod grouping;
pub mod logging;
pub mod schema;
pub mod series;
pub mod source;
pub mod summary;
pub mod utils;
pub mod web;
