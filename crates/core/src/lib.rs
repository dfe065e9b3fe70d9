//! Domain layer of the virtual try-on service.
//!
//! Turns a person photo plus garment/accessory images into four
//! scene-specific generation requests and assembles the results in a fixed
//! scene order. Transport to the actual image model is abstracted behind
//! [`dispatch::ImageGenerator`].

pub mod asset;
pub mod data_uri;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod scene;
pub mod selection;
pub mod submission;
