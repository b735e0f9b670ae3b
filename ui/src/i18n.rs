//! Localization for the dashboard UI.
//!
//! Messages live in embedded Fluent files:
//! ```text
//! i18n.toml
//! i18n/
//!   en-US/roofdash-ui.ftl   (fallback/reference)
//!   es-ES/roofdash-ui.ftl
//! ```
//!
//! Call [`init`] once at startup (it is idempotent), then look messages up with
//! the [`t!`](crate::t) macro, which checks keys and arguments at compile time:
//! ```ignore
//! use crate::t;
//! let heading = t!("gallery-select-cluster");
//! let option = t!("gallery-cluster-option", id = "3".to_string());
//! ```
//!
//! To add a locale, copy `en-US/roofdash-ui.ftl` to `i18n/<lang-id>/`, translate
//! the values (IDs and placeholders stay identical) and run the tests.
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use unic_langid::{langid, LanguageIdentifier};

pub use i18n_embed_fl::fl;

/// Short form of `fl!(&*LOADER, ...)`.
///
/// ```ignore
/// t!("nav-tab-general")
/// t!("card-density", value = "0.42".to_string())
/// ```
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fallback file path must be `i18n/en-US/{DOMAIN}.ftl`.
const DOMAIN: &str = "roofdash-ui";

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

/// Global loader consumed by `t!`.
pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let loader = FluentLanguageLoader::new(DOMAIN, langid!("en-US"));
    // Plain text output; bidi isolation marks would leak into labels and SVG titles.
    loader.set_use_isolating(false);
    loader
});

static INIT: Once = Once::new();

/// Load bundles for the OS-requested languages (idempotent).
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        match i18n_embed::select(&*LOADER, &Localizations, &requested) {
            Ok(selected) => tracing::debug!(?selected, "i18n languages selected"),
            Err(err) => {
                tracing::warn!(%err, "failed selecting languages; continuing with fallback")
            }
        }
    });
}

/// Switch language at runtime. Unparseable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        return Ok(());
    };
    i18n_embed::select(&*LOADER, &Localizations, &[lang]).map(|_| ())
}

/// Embedded language identifiers, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(|s| s.to_string()))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}
