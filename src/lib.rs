//! Generates random RGB bitmaps, keeps only the ones whose content has never
//! been seen before, and writes those as content-addressed PNG files.
//!
//! The [`generator::Generator`] owns a [`store::FingerprintStore`] and is driven
//! by whoever calls [`generator::Generator::tick`]; the crate does not assume
//! any particular scheduler.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod generator;
pub mod io;
pub mod status;
pub mod store;
pub mod synth;

pub use error::{ConfigError, GenError, StoreError};
pub use fingerprint::Fingerprint;
pub use generator::{GenParams, Generated, Generator, RunState};
pub use store::FingerprintStore;
