pub mod activity;
pub mod board;
pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod schedule;
pub mod storage;
pub mod suggest;
