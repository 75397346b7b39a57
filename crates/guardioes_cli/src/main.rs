//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `guardioes_core` linkage.
//! - Print the app stack route table for a locale.
//!
//! Output is deterministic: `guardioes_cli [locale]`.

use guardioes_core::{resolve, Translator, APP_STACK};

fn main() {
    let locale = std::env::args().nth(1).unwrap_or_default();
    let translator = Translator::new(&locale);

    println!("guardioes_core ping={}", guardioes_core::ping());
    println!("guardioes_core version={}", guardioes_core::core_version());
    println!("locale={}", translator.locale());
    for route in APP_STACK {
        match resolve(route.as_str(), &translator) {
            Ok(screen) => println!(
                "route={} header={}",
                route.as_str(),
                screen.title.as_deref().unwrap_or("-")
            ),
            Err(err) => println!("route={} error={err}", route.as_str()),
        }
    }
}
