#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::Arc;

use dioxus::desktop::{tao::window::WindowBuilder, Config};
use dioxus::prelude::*;
use tracing::Level;

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::core::loader;
use ui::core::{DashboardConfig, SharedConfig, SharedTable};
use ui::dashboard::Tab;
use ui::views::Dashboard;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(DesktopNavbar)]
    #[route("/")]
    Home {},
    #[route("/tab/:tab_id")]
    TabPage { tab_id: String },
}

const MAIN_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

fn main() {
    let level = std::env::var("ROOFDASH_LOG")
        .ok()
        .and_then(|raw| raw.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    if let Err(err) = dioxus::logger::init(level) {
        eprintln!("failed to initialise logging: {err}");
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let table = match loader::load_dataset(&config) {
        Ok(table) => table,
        Err(err) => {
            tracing::error!(%err, "failed to load metrics snapshot");
            std::process::exit(1);
        }
    };

    let table: SharedTable = Arc::new(table);
    let config: SharedConfig = Arc::new(config);

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title(format!("Roofdash – v{}", env!("CARGO_PKG_VERSION")))
                        .with_maximized(true),
                )
                .with_resource_directory(resolve_resource_dir()),
        )
        .with_context(table)
        .with_context(config)
        .launch(App);
}

/// Defaults, then an optional JSON file named by `ROOFDASH_CONFIG`, then `ROOFDASH_*` overrides.
fn load_config() -> Result<DashboardConfig, String> {
    let base = match std::env::var("ROOFDASH_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| format!("cannot read config {path}: {err}"))?;
            DashboardConfig::from_json(&raw)
                .map_err(|err| format!("cannot parse config {path}: {err}"))?
        }
        Err(_) => DashboardConfig::default(),
    };
    Ok(base.with_env())
}

fn nav_tab(tab_id: &str, label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        active_class: "active",
        to: Route::TabPage { tab_id: tab_id.to_string() },
        "{label}"
    })
}

#[component]
fn App() -> Element {
    ui::i18n::init();

    // AppNavbar updates this on locale switches; views read it to re-render.
    let lang_code = use_signal(|| "en-US".to_string());
    use_context_provider(|| lang_code);

    register_nav(NavBuilder { tab: nav_tab });

    rsx! {
        document::Style { "{MAIN_CSS_INLINE}" }

        // Keyed by locale so every routed view remounts with fresh strings.
        div {
            key: "{lang_code()}",
            Router::<Route> { }
        }
    }
}

fn resolve_resource_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))
    }

    #[cfg(not(debug_assertions))]
    {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("assets")))
            .unwrap_or_else(|| PathBuf::from("assets"))
    }
}

#[component]
fn DesktopNavbar() -> Element {
    rsx! {
        AppNavbar { }

        Outlet::<Route> {}
    }
}

#[component]
fn Home() -> Element {
    rsx! { Dashboard { tab_id: Tab::General.id().to_string() } }
}

#[component]
fn TabPage(tab_id: String) -> Element {
    rsx! { Dashboard { tab_id } }
}
