//! All Books Page
//!
//! Read-only listing of the whole catalog.

use leptos::*;

use crate::api;
use crate::components::{BookCard, Loading};

#[component]
pub fn Books() -> impl IntoView {
    let books = create_local_resource(|| (), |_| async move { api::fetch_books().await });

    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"All Books"</h1>
                <p class="text-gray-400 mt-1">"Everything in the catalog."</p>
            </div>

            <Suspense fallback=|| view! { <Loading /> }>
                {move || books.get().map(|result| match result {
                    Ok(books) if books.is_empty() => view! {
                        <p class="text-gray-400">"The catalog is empty."</p>
                    }.into_view(),
                    Ok(books) => view! {
                        <div class="grid md:grid-cols-3 gap-6">
                            {books.into_iter()
                                .map(|book| view! { <BookCard book=book /> })
                                .collect_view()}
                        </div>
                    }.into_view(),
                    Err(failure) => view! {
                        <p class="text-red-400">{format!("Failed to fetch books: {}", failure)}</p>
                    }.into_view(),
                })}
            </Suspense>
        </div>
    }
}
