//! Pages
//!
//! Top-level page components for each route.

pub mod books;
pub mod favorites;
pub mod home;
pub mod login;
pub mod register;
pub mod search;

pub use books::Books;
pub use favorites::Favorites;
pub use home::Home;
pub use login::Login;
pub use register::Register;
pub use search::SearchResults;
