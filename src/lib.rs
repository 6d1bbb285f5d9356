//! EEM Sheet - Library Root
//!
//! Character-sheet state core: attribute store, derived-stat
//! propagation, ordered skill entries, debounced slot persistence and
//! dice. Re-exports all modules for the shell binary, integration
//! tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
