// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod assembler;
pub mod cache;
pub mod classifier;
pub mod contact;
pub mod foursquare_client;
pub mod geocoder;
pub mod google_places_client;
pub mod pipeline;
pub mod provider;

pub use assembler::PresentationAssembler;
pub use cache::{start_cleanup_task, GeocodeCache};
pub use contact::ContactDesk;
pub use pipeline::SearchPipeline;
