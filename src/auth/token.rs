//! Bearer token secret wrapper and the cached record built from an identity response.

pub mod record;
pub mod secret;
