//! Image redaction editor core.
//!
//! Loads a raster image, lets the user place rectangular masks (solid fill,
//! blur, or pixelate) with mouse, touch or keyboard, and exports a PNG with
//! the masks burned in. Export is gated behind a zoomable preview and an
//! explicit "I verified this is unreadable" confirmation.
//!
//! The crate has no DOM or windowing code. A host wires real input events to
//! [`editor::Editor`] (or directly to [`engine::EngineCore`]), draws the
//! [`render::Scene`] it gets back, and carries out the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | Editor-level state machine and the [`editor::Host`] trait |
//! | [`engine`] | Pointer / keyboard / wheel handling in testable [`engine::EngineCore`] |
//! | [`doc`] | Mask types, snapping, and the mask store with undo |
//! | [`history`] | Bounded snapshot stack |
//! | [`camera`] | Viewport pan/zoom and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing of mask bodies and resize handles |
//! | [`loader`] | Format sniffing, size guards, decode, downscale |
//! | [`render`] | Export compositor and editor overlay scene |
//! | [`export`] | Preview gate, PNG encoding, file naming |
//! | [`config`] | Tunables from defaults and `REDACT_*` environment variables |
//! | [`error`] | Load and export errors |
//! | [`i18n`] | Japanese / English messages and the language store seam |
//! | [`consts`] | Shared numeric constants (zoom limits, safety floors, etc.) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod editor;
pub mod engine;
pub mod error;
pub mod export;
pub mod history;
pub mod hit;
pub mod i18n;
pub mod input;
pub mod loader;
pub mod render;
