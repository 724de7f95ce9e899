//! HTTP access to the OksHouse admin backend
//!
//! [`AdminClient`] implements [`okshouse_admin_core::AdminApi`] over
//! `reqwest`; [`AuthorizedClient`] sends authenticated requests on behalf
//! of a session.

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::{AdminClient, AdminClientBuilder, AuthorizedClient, SessionHooks};
