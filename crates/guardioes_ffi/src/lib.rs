//! Flutter-facing bridge over `guardioes_core`.

pub mod api;
mod shell;
