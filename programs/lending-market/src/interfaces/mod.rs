//! Interfaces for external collaborators (price oracle, rate model)

pub mod oracle;
pub mod irm;

pub use oracle::*;
pub use irm::*;
