//! Favorites Page
//!
//! The session user's saved books, with remove. Wrapped in
//! [`Protected`](crate::components::Protected) by the router.

use leptos::*;

use crate::components::{BookCard, CardSkeleton};
use crate::state::global::use_global_state;

#[component]
pub fn Favorites() -> impl IntoView {
    let state = use_global_state();

    // Fetch on mount
    create_effect(move |_| {
        spawn_local(state.fetch_favorites());
    });

    let remove = move |favorite_id: i64| {
        spawn_local(async move {
            match state.remove_favorite(favorite_id).await {
                Ok(()) => state.show_success("Removed from favorites!"),
                Err(message) => state.show_error(&message),
            }
        });
    };

    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Favorites"</h1>
                <p class="text-gray-400 mt-1">"Your saved books appear here."</p>
            </div>

            {move || {
                if state.loading.get() {
                    view! { <CardSkeleton /> }.into_view()
                } else if state.favorites.with(Vec::is_empty) && state.error.get().is_none() {
                    view! {
                        <p class="text-gray-400">"No favorites yet. Go search and add some!"</p>
                    }.into_view()
                } else {
                    view! {}.into_view()
                }
            }}

            <div class="grid md:grid-cols-3 gap-6">
                <For
                    each=move || state.favorites.get()
                    key=|favorite| favorite.favorite_id
                    children=move |favorite| {
                        let favorite_id = favorite.favorite_id;
                        view! {
                            <BookCard book=favorite.book>
                                <button
                                    class="px-4 py-2 bg-red-600 hover:bg-red-700 rounded-lg font-medium"
                                    on:click=move |_| remove(favorite_id)
                                >
                                    "Remove"
                                </button>
                            </BookCard>
                        }
                    }
                />
            </div>
        </div>
    }
}
