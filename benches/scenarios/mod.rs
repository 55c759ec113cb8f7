//! Frame-path benchmarks.
//!
//! These model the display loop: one tick per frame, then painting the
//! frame onto a surface.

mod ensemble;

pub use ensemble::bench_ensemble;
