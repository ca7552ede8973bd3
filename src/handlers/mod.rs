// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod contact;
pub mod health;
pub mod places;

pub use contact::config as contact_config;
pub use health::config as health_config;
pub use places::config as places_config;
pub use places::PlacesState;
