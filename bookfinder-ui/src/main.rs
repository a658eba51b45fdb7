//! Book Finder Web Client
//!
//! Single-page client built with Leptos (WASM).
//!
//! # Features
//!
//! - Search the catalog by keyword, author, and genre
//! - Save favorites (requires an account)
//! - Rate and review books, with average ratings on every card
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It talks to the Book Finder API over HTTP and keeps the
//! login session in browser local storage.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
