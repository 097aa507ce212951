//! Infrastructure layer: adapters implementing the domain ports.

pub mod messaging;
