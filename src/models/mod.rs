// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod external_place;
pub mod marker;
pub mod place;
pub mod rating;
pub mod search;
pub mod viewport;

pub use external_place::*;
pub use marker::*;
pub use place::*;
pub use rating::*;
pub use search::*;
pub use viewport::*;
