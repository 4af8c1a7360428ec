//! Async client for the Cipherguard password-manager REST API.
//!
//! # Overview
//! Typed operations over server resources (currently Users, with their
//! embedded profile, role, GPG key and favorite). Each operation is one HTTP
//! round-trip: validate input, build the request, run it through a
//! `Transport`, decode the `{header, body}` envelope into a typed result.
//!
//! # Design
//! - `Client` is stateless: configuration plus a transport, nothing else.
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`),
//!   so the whole pipeline short of the wire can be exercised with a scripted
//!   `Transport`.
//! - Every operation takes a `RequestContext` carrying cancellation and an
//!   optional deadline; the client races the transport against it.
//! - Wire types are sparse: every field is optional and omitted when `None`.
//!
//! ```no_run
//! use cipherguard_core::{Client, ClientConfig, GetUsersOptions, RequestContext};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), cipherguard_core::ApiError> {
//! let client = Client::new(ClientConfig::from_env()?)?;
//! let ctx = RequestContext::new().with_timeout(Duration::from_secs(5));
//! let admins = client
//!     .get_users(&ctx, Some(&GetUsersOptions::default().admins_only()))
//!     .await?;
//! println!("{} admins", admins.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;
pub mod users;
pub mod validate;

pub use client::Client;
pub use config::ClientConfig;
pub use context::RequestContext;
pub use envelope::{ApiHeader, ApiResponse};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::QueryOptions;
pub use transport::Transport;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use types::{Favorite, GpgKey, Profile, Role, Time, User, USER_LOCALE_EN_UK};
pub use users::GetUsersOptions;
pub use validate::check_uuid_format;
