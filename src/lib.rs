//! Hands-free cooking assistant: voice commands in, spoken guidance out.

pub mod assistant;
pub mod command;
pub mod config;
pub mod controller;
pub mod kitchen;
pub mod recipe;
pub mod speech;
