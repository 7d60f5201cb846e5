//! Bearer token model and unverified JWT claim decoding.

pub mod claims;
pub mod secret;

pub use claims::*;
pub use secret::*;
