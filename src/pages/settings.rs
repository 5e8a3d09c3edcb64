//! Settings page: profile summary plus the section selector.

use leptos::prelude::*;

use crate::session::BrowserSession;
use crate::state::session::Section;

/// Settings page — fetches the full account and toggles which section
/// (profile, lessons, historic) is visible. Exactly one section shows at
/// a time.
#[component]
pub fn SettingsPage() -> impl IntoView {
    let session = expect_context::<send_wrapper::SendWrapper<BrowserSession>>().take();

    let account = LocalResource::new({
        let session = session.clone();
        move || {
            let session = session.clone();
            async move { session.full_account().await.ok().flatten() }
        }
    });

    // Local mirror of the service's display selector, for re-rendering.
    let selected = RwSignal::new(Section::Profile);

    view! {
        <div class="settings-page">
            <header class="settings-page__header">
                <h1>"Mon espace"</h1>
                <Suspense fallback=move || view! { <p>"Chargement..."</p> }>
                    {move || {
                        account
                            .get()
                            .map(|full| match full {
                                Some(full) => view! {
                                    <p class="settings-page__identity">
                                        {format!("{} {} — {}", full.first_name, full.last_name, full.email)}
                                    </p>
                                }
                                    .into_any(),
                                None => view! {
                                    <p class="settings-page__identity">"Non connecté"</p>
                                }
                                    .into_any(),
                            })
                    }}
                </Suspense>
            </header>

            <nav class="settings-page__tabs">
                <SectionTab label="Profil" section=Section::Profile selected=selected session=session.clone()/>
                <SectionTab label="Cours" section=Section::Lessons selected=selected session=session.clone()/>
                <SectionTab label="Historique" section=Section::Historic selected=selected session=session/>
            </nav>

            <section class="settings-page__body">
                {move || match selected.get() {
                    Section::Profile => view! { <p>"Profil"</p> }.into_any(),
                    Section::Lessons => view! { <p>"Cours"</p> }.into_any(),
                    Section::Historic => view! { <p>"Historique"</p> }.into_any(),
                }}
            </section>
        </div>
    }
}

/// One section tab. Selecting it clears every other section through the
/// session service and updates the local mirror.
#[component]
fn SectionTab(
    label: &'static str,
    section: Section,
    selected: RwSignal<Section>,
    session: BrowserSession,
) -> impl IntoView {
    view! {
        <button
            class="settings-page__tab"
            class=("settings-page__tab--active", move || selected.get() == section)
            on:click=move |_| {
                session.set_display_section(section);
                selected.set(section);
            }
        >
            {label}
        </button>
    }
}
