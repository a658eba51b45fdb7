//! Search Results Page
//!
//! Runs the search described by the query string, shows rating summaries on
//! each card, and offers add-to-favorites and an inline review form listing
//! the book's existing reviews.

use leptos::*;
use leptos_router::*;
use std::collections::HashMap;

use crate::api::{RatingSummary, SearchQuery};
use crate::components::{BookCard, CardSkeleton, ReviewForm, ReviewList, MAX_COMMENT_CHARS};
use crate::state::global::{use_global_state, LOGIN_TO_REVIEW};

#[component]
pub fn SearchResults() -> impl IntoView {
    let state = use_global_state();
    let params = use_query_map();

    let query = create_memo(move |_| {
        params.with(|p| {
            let field = |key: &str| p.get(key).cloned().unwrap_or_default();
            SearchQuery::new(&field("q"), &field("author"), &field("genre"))
        })
    });

    let (summaries, set_summaries) = create_signal(HashMap::<i64, RatingSummary>::new());
    let (open_review, set_open_review) = create_signal(None::<i64>);

    // Re-run the search whenever the query string changes
    create_effect(move |_| {
        let query = query.get();
        spawn_local(state.search(query));
    });

    let refresh_summaries = move || {
        let ids: Vec<i64> = state
            .search_results
            .with_untracked(|books| books.iter().map(|b| b.id).collect());
        spawn_local(async move {
            let map = state.fetch_review_summary(ids).await;
            set_summaries.set(map);
        });
    };

    // Load summaries for the current result set
    create_effect(move |_| {
        state.search_results.with(|_| ());
        refresh_summaries();
    });

    let add_favorite = move |book_id: i64| {
        spawn_local(async move {
            match state.add_favorite(book_id).await {
                Ok(()) => state.show_success("Added to favorites!"),
                Err(message) => state.show_error(&message),
            }
        });
    };

    let toggle_review = move |book_id: i64| {
        if !state.is_logged_in() {
            state.show_error(LOGIN_TO_REVIEW);
            return;
        }

        set_open_review.update(|open| {
            *open = if *open == Some(book_id) { None } else { Some(book_id) };
        });
    };

    let save_review = move |book_id: i64, rating: u8, comment: String| {
        if comment.chars().count() > MAX_COMMENT_CHARS {
            state.show_error("Comment must be 500 characters or less.");
            return;
        }

        spawn_local(async move {
            match state.save_review(book_id, rating, comment).await {
                Ok(()) => {
                    state.show_success("Review saved!");
                    set_open_review.set(None);
                    refresh_summaries();
                }
                Err(message) => state.show_error(&message),
            }
        });
    };

    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Search Results"</h1>
                <p class="text-gray-400 mt-1">"Showing matches for your filters."</p>
            </div>

            {move || {
                if state.loading.get() {
                    view! { <CardSkeleton /> }.into_view()
                } else if state.search_results.with(Vec::is_empty) && state.error.get().is_none() {
                    view! {
                        <p class="text-gray-400">"No results found. Try different keywords."</p>
                    }.into_view()
                } else {
                    view! {}.into_view()
                }
            }}

            <div class="grid md:grid-cols-3 gap-6">
                <For
                    each=move || state.search_results.get()
                    key=|book| book.id
                    children=move |book| {
                        let book_id = book.id;
                        let summary = Signal::derive(move || {
                            summaries.with(|map| map.get(&book_id).copied())
                        });

                        view! {
                            <BookCard book=book summary=summary>
                                <div class="flex space-x-2">
                                    <button
                                        class="px-4 py-2 bg-amber-600 hover:bg-amber-700 rounded-lg font-medium"
                                        on:click=move |_| add_favorite(book_id)
                                    >
                                        "Add to Favorites"
                                    </button>
                                    <button
                                        class="px-4 py-2 bg-gray-600 hover:bg-gray-500 rounded-lg"
                                        on:click=move |_| toggle_review(book_id)
                                    >
                                        "Rate & Review"
                                    </button>
                                </div>

                                <Show when=move || open_review.get() == Some(book_id)>
                                    <ReviewForm
                                        on_save=move |(rating, comment)| save_review(book_id, rating, comment)
                                        on_cancel=move |_| set_open_review.set(None)
                                    />
                                    <ReviewList book_id=book_id />
                                </Show>
                            </BookCard>
                        }
                    }
                />
            </div>
        </div>
    }
}
