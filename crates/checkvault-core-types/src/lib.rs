//! Core types shared across checkvault crates
//!
//! This crate provides the small vocabulary used by both the error and
//! logging facilities:
//!
//! - **Tick correlation**: `TickId` identifies one run of the backup pipeline
//! - **Sensitive data**: `Sensitive<T>` marker for automatic redaction
//! - **Schema constants**: canonical field keys and event names

pub mod schema;
pub mod sensitive;
pub mod tick;

pub use sensitive::Sensitive;
pub use tick::TickId;
