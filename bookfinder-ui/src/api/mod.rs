//! API Access
//!
//! HTTP client for the Book Finder REST API and the JSON shapes it returns.

pub mod client;

pub use client::*;
