// src/config/mod.rs
// DOCUMENTATION: Configuration module organization
// PURPOSE: Re-export configuration components

pub mod catalog;
pub mod env;

pub use catalog::*;
pub use env::Config;
