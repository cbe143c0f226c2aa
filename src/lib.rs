//! Anchored overlays for terminal dashboards.
//!
//! A small document model stands in for the page: trigger controls are
//! nodes with bounding rectangles, overlays mount into a shared portal
//! layer, and document-level listeners decide when an overlay is dismissed.
//! [`host::OverlayHost`] ties the pieces together and is the entry point for
//! embedders; [`dashboard::Dashboard`] is the page used by the demo binary.

pub mod config;
pub mod constants;
pub mod content;
pub mod coordinator;
pub mod dashboard;
pub mod dismissal;
pub mod document;
pub mod drivers;
pub mod event_loop;
pub mod focus;
pub mod geometry;
pub mod host;
pub mod input;
pub mod keybindings;
pub mod listeners;
pub mod log_buffer;
pub mod navigator;
pub mod overlays;
pub mod portal;
pub mod position;
pub mod state;
pub mod theme;
pub mod timers;
pub mod tracing_sub;
pub mod ui;
