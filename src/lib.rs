pub mod bot;
pub mod config;
pub mod monitor;
pub mod probe;
pub mod storage;
pub mod web;
