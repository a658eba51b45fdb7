//! UI Components
//!
//! Reusable Leptos components shared by the pages.

pub mod book_card;
pub mod loading;
pub mod nav;
pub mod protected;
pub mod toast;

pub use book_card::{BookCard, ReviewForm, ReviewList, MAX_COMMENT_CHARS};
pub use loading::{CardSkeleton, Loading};
pub use nav::Nav;
pub use protected::Protected;
pub use toast::Toast;
