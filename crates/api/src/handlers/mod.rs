//! Request handlers.
//!
//! Handlers translate HTTP input into selection actions and batch runs from
//! `tryon_core` and map failures via [`AppError`](crate::error::AppError).

pub mod sessions;
pub mod try_on;
