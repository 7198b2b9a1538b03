//! MYBN Core - Shared domain types.
//!
//! This crate provides the types used across the MYBN directory client:
//! - `directory` - Session management, catalog client and listing controller
//! - `cli` - Command-line front end for the catalog and sign-in flows
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Users, sign-in inputs, businesses and listing pages
//! - [`text`] - Text cleanup for server-provided content

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod text;
pub mod types;

pub use types::*;
