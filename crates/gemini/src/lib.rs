//! Gemini REST client and the Gemini-backed image generator.
//!
//! Provides typed `generateContent` messages, an HTTP wrapper with error
//! classification, environment-driven configuration, and an
//! [`ImageGenerator`](tryon_core::dispatch::ImageGenerator) implementation
//! for the try-on orchestrator.

pub mod api;
pub mod config;
pub mod generator;
pub mod messages;
