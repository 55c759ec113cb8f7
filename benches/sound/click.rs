//! Benchmarks for click bank rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polymetro::sound::{ClickEngine, SoundEngine, SoundHandle};
use polymetro::tones::TONE_TABLE;

use crate::{BLOCK_SIZES, VOICE_COUNTS};

pub fn bench_click(c: &mut Criterion) {
    let mut group = c.benchmark_group("sound/click");

    for &voices in VOICE_COUNTS {
        let mut engine = ClickEngine::new(48_000.0);
        // Handles must outlive the benchmark or their slots are released
        let mut handles = Vec::with_capacity(voices);
        for (i, tone) in TONE_TABLE.iter().take(voices).enumerate() {
            let mut handle = engine.create_handle().unwrap();
            handle.play(40.0 + i as f64, tone).unwrap();
            handles.push(handle);
        }
        let bank = engine.bank();

        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            let id = BenchmarkId::new(format!("{}_voices", voices), size);
            group.bench_with_input(id, &size, |b, _| {
                let mut bank = bank.lock().unwrap();
                b.iter(|| {
                    bank.render_block(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
