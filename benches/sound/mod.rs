//! Benchmarks for the reference sound engine.

mod click;

pub use click::bench_click;
