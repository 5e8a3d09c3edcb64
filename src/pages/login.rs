//! Login page mediating the credential form.

use leptos::prelude::*;

use crate::session::BrowserSession;

/// Login page — collects email and password and delegates to the session
/// service with back-navigation requested. Signed-in visitors are bounced
/// straight back instead of seeing the form again.
#[component]
pub fn LoginPage() -> impl IntoView {
    let session = expect_context::<send_wrapper::SendWrapper<BrowserSession>>().take();

    // If the user is authenticated, they should not be here.
    {
        let session = session.clone();
        Effect::new(move || {
            if session.is_authenticated() {
                session.navigate_back();
            }
        });
    }

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let session = session.clone();
        leptos::task::spawn_local(async move {
            let result = session
                .login(&email.get_untracked(), &password.get_untracked(), true)
                .await;
            match result {
                Ok(_) => error.set(None),
                Err(err) => error.set(Some(err.to_string())),
            }
        });
    };

    view! {
        <div class="login-page">
            <h1>"Connexion"</h1>
            <form class="login-page__form" on:submit=on_submit>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=email
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Mot de passe"
                    prop:value=password
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <button type="submit" class="btn btn--primary">
                    "Se connecter"
                </button>
            </form>
            {move || {
                error.get().map(|message| {
                    view! { <p class="login-page__error">{message}</p> }
                })
            }}
        </div>
    }
}
