//! Root application component with routing and the session context.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use send_wrapper::SendWrapper;
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::pages::{login::LoginPage, settings::SettingsPage};
use crate::session::BrowserSession;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="fr">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Constructs the one session service for the page and provides it via
/// context — session state has a single explicit owner, no ambient global.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // SendWrapper satisfies provide_context's Send + Sync bound; the
    // session only ever lives on the single UI thread.
    provide_context(SendWrapper::new(BrowserSession::browser()));

    view! {
        <Stylesheet id="leptos" href="/pkg/espace-client.css"/>
        <Title text="Mon espace"/>

        <Router>
            <Routes fallback=|| "Page introuvable.".into_view()>
                <Route path=StaticSegment("monespace") view=LoginPage/>
                <Route path=StaticSegment("settings") view=SettingsPage/>
            </Routes>
        </Router>
    }
}
