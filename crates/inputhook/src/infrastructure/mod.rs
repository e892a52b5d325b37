//! Infrastructure layer: OS-facing adapters.
//!
//! Contains the platform implementations behind the application-layer
//! `Platform` and `InputHelper` seams, plus configuration file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `inputhook_core`, but MUST NOT be imported by the application layer outside
//! of its tests.

pub mod input_helper;
pub mod platform;
pub mod storage;
