//! # gic support
//!
//! Shared helpers for the gic crates.
//!
//! This crate provides:
//! - Type name shortening for readable messages
//! - Chain and plan rendering
//! - "Did you mean?" suggestions

pub mod rendering;
