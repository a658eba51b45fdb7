//! Book Card Component
//!
//! A catalog entry with its cover, details, rating line, and an action slot.

use leptos::*;

use crate::api::{Book, RatingSummary, Review};
use crate::state::global::use_global_state;

/// Maximum review comment length, in characters
pub const MAX_COMMENT_CHARS: usize = 500;

/// `round(avg)` filled stars followed by empty ones, five in total
pub fn render_stars(avg: f64) -> String {
    let filled = avg.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Rating tag text for a card
pub fn rating_label(summary: Option<RatingSummary>) -> String {
    match summary.and_then(|s| s.avg_rating.map(|avg| (avg, s.review_count))) {
        Some((avg, count)) => format!("{} • {} ({})", avg, render_stars(avg), count),
        None => "No ratings yet".to_string(),
    }
}

/// Book card with optional rating and caller-supplied actions
#[component]
pub fn BookCard(
    book: Book,
    /// Rating shown on the card; no rating line when absent
    #[prop(optional, into)]
    summary: Option<Signal<Option<RatingSummary>>>,
    #[prop(optional)]
    children: Option<Children>,
) -> impl IntoView {
    let year = book
        .publication_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    view! {
        <div class="bg-gray-800 rounded-xl overflow-hidden flex flex-col">
            <div class="h-48 bg-gray-700 flex items-center justify-center">
                {match book.cover.clone() {
                    Some(src) => view! {
                        <img src=src alt=book.title.clone() class="h-full w-full object-cover" />
                    }.into_view(),
                    None => view! {
                        <span class="text-gray-400 text-sm">"NO COVER"</span>
                    }.into_view(),
                }}
            </div>

            <div class="p-4 flex-1 flex flex-col space-y-3">
                <h3 class="text-lg font-semibold">{book.title.clone()}</h3>
                <p class="text-gray-400 text-sm">{book.desc.clone()}</p>

                <div class="flex flex-wrap gap-2 text-xs">
                    <span class="bg-gray-700 rounded px-2 py-1">"👤 " {book.author.clone()}</span>
                    <span class="bg-gray-700 rounded px-2 py-1">"🏷️ " {book.genre.clone()}</span>
                    <span class="bg-gray-700 rounded px-2 py-1">"📅 " {year}</span>
                    {summary.map(|summary| view! {
                        <span class="bg-gray-700 rounded px-2 py-1">
                            "⭐ " {move || rating_label(summary.get())}
                        </span>
                    })}
                </div>

                {children.map(|children| view! {
                    <div class="mt-auto pt-2">{children()}</div>
                })}
            </div>
        </div>
    }
}

/// Inline rate & review form
#[component]
pub fn ReviewForm(
    #[prop(into)]
    on_save: Callback<(u8, String)>,
    #[prop(into)]
    on_cancel: Callback<()>,
) -> impl IntoView {
    let (rating, set_rating) = create_signal(5u8);
    let (comment, set_comment) = create_signal(String::new());

    view! {
        <div class="bg-gray-900 rounded-lg p-3 mt-3 space-y-3">
            <div class="flex items-center space-x-3">
                <span class="text-sm text-gray-300">"Your rating:"</span>
                <select
                    class="bg-gray-700 rounded px-2 py-1"
                    on:change=move |ev| {
                        if let Ok(value) = event_target_value(&ev).parse() {
                            set_rating.set(value);
                        }
                    }
                >
                    {[5u8, 4, 3, 2, 1].into_iter().map(|value| view! {
                        <option value=value.to_string() selected=move || rating.get() == value>
                            {format!("{} ★", value)}
                        </option>
                    }).collect_view()}
                </select>
                <span class="text-amber-400">{move || render_stars(rating.get() as f64)}</span>
            </div>

            <textarea
                class="w-full bg-gray-700 rounded px-3 py-2 h-24"
                placeholder="Optional comment (max 500 chars)"
                prop:value=move || comment.get()
                on:input=move |ev| set_comment.set(event_target_value(&ev))
            />

            <div class="flex space-x-2">
                <button
                    class="px-4 py-2 bg-amber-600 hover:bg-amber-700 rounded-lg font-medium"
                    on:click=move |_| on_save.call((rating.get_untracked(), comment.get_untracked()))
                >
                    "Save Review"
                </button>
                <button
                    class="px-4 py-2 bg-gray-600 hover:bg-gray-500 rounded-lg"
                    on:click=move |_| on_cancel.call(())
                >
                    "Cancel"
                </button>
            </div>
        </div>
    }
}

/// Existing reviews for a book, newest first
#[component]
pub fn ReviewList(book_id: i64) -> impl IntoView {
    let state = use_global_state();
    let reviews = create_local_resource(move || book_id, move |id| state.fetch_book_reviews(id));

    view! {
        <Suspense fallback=|| view! { <p class="text-sm text-gray-400">"Loading reviews..."</p> }>
            {move || reviews.get().map(|all| {
                if all.reviews.is_empty() {
                    view! { <p class="text-sm text-gray-400">"No reviews yet. Be the first!"</p> }.into_view()
                } else {
                    view! {
                        <ul class="space-y-2 mt-3">
                            {all.reviews.into_iter().map(|review| view! { <ReviewItem review=review /> }).collect_view()}
                        </ul>
                    }.into_view()
                }
            })}
        </Suspense>
    }
}

#[component]
fn ReviewItem(review: Review) -> impl IntoView {
    view! {
        <li class="bg-gray-900 rounded-lg px-3 py-2 text-sm">
            <div class="flex justify-between">
                <b>{review.user_name}</b>
                <span class="text-amber-400">{render_stars(review.rating as f64)}</span>
            </div>
            {review.comment.map(|comment| view! { <p class="text-gray-300 mt-1">{comment}</p> })}
        </li>
    }
}
