// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// that tests can import types via `hanmadi::hangul::*` / `hanmadi::store::*`.
// The UI modules are only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

// Public: used directly by tests and benchmarks
pub mod config;
pub mod curriculum;
pub mod engine;
pub mod hangul;
pub mod keyboard;
pub mod session;
pub mod speech;
pub mod store;
pub mod user;

// Private: required transitively by the app module
mod app;
mod event;
mod logging;
mod ui;
