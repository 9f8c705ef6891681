pub mod apply;
pub mod completions;
pub mod config;
pub mod exec;
pub mod export;
pub mod merge;
pub mod report;
pub mod show;
