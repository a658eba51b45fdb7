//! API Routes
//!
//! Route handlers organized by resource.

pub mod auth;
pub mod books;
pub mod favorites;
pub mod health;
pub mod reviews;
