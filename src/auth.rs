//! Client credentials and the cached bearer token model.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{record::*, secret::*};
