pub mod actions;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod grouping;
pub mod model;
pub mod months;
pub mod notify;
pub mod risk;
pub mod stats;
pub mod storage;
