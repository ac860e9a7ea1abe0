//! Tiny HTTP relay for a nutrition data API. It keeps an OAuth 2.0 client-credentials token
//! warm and forwards food searches and food lookups with the upstream JSON left untouched.
//!
//! The crate is split along the request path:
//!
//! - [`server`] exposes the axum router and turns errors into JSON envelopes.
//! - [`relay`] builds the form-encoded upstream calls.
//! - [`cache`] hands out bearer tokens and refreshes them lazily.
//! - [`oauth`] performs the client-credentials exchange against the identity endpoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod relay;
pub mod server;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// The binary installs the `color-eyre` report handler.
use color_eyre as _;
#[cfg(test)] use httpmock as _;
