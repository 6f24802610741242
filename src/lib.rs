//! Hardware performance counters for application code and tracing spans.
//!
//! Counts CPU cycles, retired instructions, cache references and misses,
//! branch instructions and misses, and bus cycles of the calling process via
//! the `perf_event_open` system call.
//!
//! ## Example
//!
//! Count cycles and instructions of the (inefficient) fibonacci calculation.
//!
//! ```rust,no_run
//! use perfevents::count::SessionBatch;
//!
//! let mut batch = SessionBatch::open_all(["cpu-cycles", "instructions"]).unwrap();
//!
//! fn fib(n: usize) -> usize {
//!     match n {
//!         0 => 0,
//!         1 => 1,
//!         n => fib(n - 1) + fib(n - 2),
//!     }
//! }
//! std::hint::black_box(fib(30));
//!
//! for reading in batch.read_all().unwrap() {
//!     println!("{}", reading); // e.g. `instructions:12345678`
//! }
//! batch.close_all().unwrap();
//! ```
//!
//! ## Supported hosts
//!
//! Linux on `x86_64` and `ppc64le`. Any other machine is rejected with
//! [`Error::UnsupportedArchitecture`] before a counter is opened.
//!
//! ## Features
//!
//! - `subscriber`: [`span::PerfEventsLayer`], a `tracing-subscriber` layer
//!   that attaches counters to spans.
//! - `serde`: serialization for events, architecture profiles and readings.

pub mod arch;
pub mod backend;
pub mod config;
pub mod count;
mod error;
pub mod event;
mod ffi;
pub mod span;

pub use error::*;
