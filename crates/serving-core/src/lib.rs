//! serving-core: Route traffic types and validation
//!
//! This crate contains the traffic-splitting types for the Route resource and
//! the rules that decide whether a Route is accepted.

pub mod errors;
pub mod types;
pub mod validation;

pub use errors::*;
pub use types::*;
pub use validation::*;
