use crate::dashboard::Tab;
use crate::i18n;
use crate::t;
use dioxus::prelude::*;
use once_cell::sync::OnceCell;

/// Platform hook for building tab links.
///
/// The `ui` crate does not know the platform's `Route` enum, so the platform
/// registers a builder that turns a tab id and its localized label into a
/// `Link`. Without a builder the navbar renders plain labels.
///
/// ```ignore
/// register_nav(NavBuilder {
///     tab: |tab_id, label| rsx!(Link {
///         class: "navbar__link",
///         to: Route::Tab { tab_id: tab_id.to_string() },
///         "{label}"
///     }),
/// });
/// ```
pub struct NavBuilder {
    pub tab: fn(tab_id: &str, label: &str) -> Element,
}

static NAV_BUILDER: OnceCell<NavBuilder> = OnceCell::new();

pub fn register_nav(builder: NavBuilder) {
    let _ = NAV_BUILDER.set(builder);
}

fn tab_label(tab: Tab) -> String {
    match tab {
        Tab::General => t!("nav-tab-general"),
        Tab::Visual => t!("nav-tab-visual"),
        Tab::Distribution => t!("nav-tab-dist"),
        Tab::Top => t!("nav-tab-top"),
    }
}

#[component]
pub fn AppNavbar() -> Element {
    i18n::init();

    let mut current_lang = use_signal(|| "en-US".to_string());
    let langs = use_signal(i18n::available_languages);
    let show_switcher = langs().len() > 1;
    let lang_code_ctx: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code_ctx.as_ref().map(|c| c()).unwrap_or_default();

    let on_change = move |evt: FormEvent| {
        let val = evt.value();
        match i18n::set_language(&val) {
            Ok(()) => {
                tracing::info!(lang = %val, "locale switched");
                current_lang.set(val.clone());
                if let Some(mut code) = lang_code_ctx {
                    code.set(val);
                }
            }
            Err(err) => tracing::warn!(lang = %val, %err, "locale switch failed"),
        }
    };

    let builder = NAV_BUILDER.get();
    let links = Tab::ALL.into_iter().map(move |tab| {
        let label = tab_label(tab);
        match builder {
            Some(b) => (b.tab)(tab.id(), &label),
            None => rsx! { span { class: "navbar__link", "{label}" } },
        }
    });

    rsx! {
        header { id: "navbar", class: "navbar",
            div { style: "display:none", "{lang_marker}" }
            div { class: "navbar__inner",
                div { class: "navbar__brand",
                    span { class: "navbar__brand-mark", "Roofdash" }
                    span { class: "navbar__brand-subtitle", {t!("tagline")} }
                }

                nav { class: "navbar__links", {links} }

                if show_switcher {
                    div { class: "navbar__locale",
                        label {
                            class: "visually-hidden",
                            r#for: "locale-select",
                            {t!("nav-language-label")}
                        }
                        select {
                            id: "locale-select",
                            value: "{current_lang()}",
                            oninput: on_change,
                            for code in langs().into_iter() {
                                option { key: "{code}", value: "{code}", "{code}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
