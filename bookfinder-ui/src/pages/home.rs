//! Home Page
//!
//! Search form: keyword, author, and genre. Submitting navigates to
//! `/search` with the non-blank fields in the query string.

use leptos::*;
use leptos_router::*;

use crate::api::SearchQuery;
use crate::state::global::use_global_state;

#[component]
pub fn Home() -> impl IntoView {
    let state = use_global_state();
    let navigate = use_navigate();

    let (q, set_q) = create_signal(String::new());
    let (author, set_author) = create_signal(String::new());
    let (genre, set_genre) = create_signal(String::new());

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let query = SearchQuery::new(&q.get(), &author.get(), &genre.get());
        if query.is_empty() {
            state.show_error("Please enter at least one search field.");
            return;
        }

        navigate(
            &format!("/search?{}", query.to_query_string()),
            Default::default(),
        );
    };

    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Find your next read"</h1>
                <p class="text-gray-400 mt-1">
                    "Search by keyword, author, or genre. Save favorites with one click."
                </p>
            </div>

            <section class="bg-gray-800 rounded-xl p-6">
                <form class="space-y-4" on:submit=on_submit>
                    <input
                        type="text"
                        placeholder="Keyword (title/description)"
                        prop:value=move || q.get()
                        on:input=move |ev| set_q.set(event_target_value(&ev))
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-amber-500 focus:outline-none"
                    />

                    <div class="grid md:grid-cols-3 gap-4">
                        <input
                            type="text"
                            placeholder="Author"
                            prop:value=move || author.get()
                            on:input=move |ev| set_author.set(event_target_value(&ev))
                            class="bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-amber-500 focus:outline-none"
                        />
                        <input
                            type="text"
                            placeholder="Genre"
                            prop:value=move || genre.get()
                            on:input=move |ev| set_genre.set(event_target_value(&ev))
                            class="bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-amber-500 focus:outline-none"
                        />
                        <button
                            type="submit"
                            class="px-6 py-3 bg-amber-600 hover:bg-amber-700 rounded-lg font-medium transition-colors"
                        >
                            "Search"
                        </button>
                    </div>
                </form>
            </section>
        </div>
    }
}
