// lib.rs
pub mod catalog;
pub mod continent;
pub mod country;
pub mod error;
pub mod hint;
pub mod history;
pub mod quiz;
pub mod quiz_config;
pub mod round;
pub mod scoring;
pub mod timer;
