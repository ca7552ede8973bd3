// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod contact;
pub mod location;
pub mod place;
pub mod review;

pub use contact::*;
pub use location::*;
pub use place::*;
pub use review::*;
