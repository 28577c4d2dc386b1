//! salesdash: sales performance reporting over an e-commerce order export.

pub mod cli;
pub mod config;
pub mod data;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod web;
