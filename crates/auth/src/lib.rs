//! `shopfloor-auth`: who is calling.
//!
//! Decoupled from HTTP and storage: the API layer extracts a bearer token and
//! asks a [`TokenValidator`] for the [`Principal`] behind it.

pub mod principal;
pub mod roles;
pub mod token;

pub use principal::Principal;
pub use roles::Role;
pub use token::{StaticTokenValidator, TokenError, TokenValidator};
