//! Benchmarks for ensemble ticks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polymetro::color::Rgb;
use polymetro::render::{RenderError, Renderer};
use polymetro::sound::SilentEngine;
use polymetro::timing::ManualClock;
use polymetro::{Ensemble, EnsembleConfig};

use crate::VOICE_COUNTS;

/// 60fps
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Surface that accepts every call and keeps nothing.
struct NullRenderer;

impl Renderer for NullRenderer {
    fn clear_frame(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn draw_ring(
        &mut self,
        center_x: f64,
        center_y: f64,
        radius: f64,
        stroke_width: f64,
        color: Rgb,
        alpha: f64,
    ) -> Result<(), RenderError> {
        black_box((center_x, center_y, radius, stroke_width, color, alpha));
        Ok(())
    }
}

fn running_ensemble(voices: usize) -> (Ensemble<SilentEngine, ManualClock>, ManualClock) {
    let clock = ManualClock::new(0.0);
    let mut ensemble = Ensemble::with_clock(SilentEngine, clock.clone());
    // Tighter spacing so the full tone table fits on the default stage
    ensemble
        .configure_with(EnsembleConfig::new(voices, 40.0, 1.0).ring_spacing(6.0))
        .unwrap();
    ensemble.start().unwrap();
    (ensemble, clock)
}

pub fn bench_ensemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/ensemble");

    for &voices in VOICE_COUNTS {
        let (mut ensemble, clock) = running_ensemble(voices);
        group.bench_with_input(BenchmarkId::new("tick", voices), &voices, |b, _| {
            b.iter(|| {
                clock.advance(FRAME_MS);
                black_box(ensemble.on_tick().unwrap());
            })
        });

        let (mut ensemble, clock) = running_ensemble(voices);
        let mut renderer = NullRenderer;
        group.bench_with_input(BenchmarkId::new("render_tick", voices), &voices, |b, _| {
            b.iter(|| {
                clock.advance(FRAME_MS);
                black_box(ensemble.render_tick(&mut renderer).unwrap());
            })
        });
    }

    group.finish();
}
