//! Shared type definitions for the Loadwatch load monitor.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the browser dashboard.
//!
//! # Modules
//!
//! - [`enums`] -- Classification, event kind, and hysteresis state enums
//! - [`structs`] -- Samples, status events, engine state, API payloads

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Classification, LastEmitted, LoadLevel, StatusEventKind};
pub use structs::{EngineState, HIGH_LOAD_THRESHOLD, Sample, StatusEvent, SystemStatusResponse};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. The files are written to the
        // `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        // Enums
        let _ = crate::enums::Classification::export_all();
        let _ = crate::enums::StatusEventKind::export_all();
        let _ = crate::enums::LastEmitted::export_all();
        let _ = crate::enums::LoadLevel::export_all();

        // Structs
        let _ = crate::structs::Sample::export_all();
        let _ = crate::structs::StatusEvent::export_all();
        let _ = crate::structs::EngineState::export_all();
        let _ = crate::structs::SystemStatusResponse::export_all();
    }
}
