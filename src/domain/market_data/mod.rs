//! Market data module - bars and series handed over by the data loader

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
