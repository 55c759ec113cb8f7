use rtrb::RingBuffer;

use polymetro::{
    sound::{ClickEngine, SoundEngine, SoundHandle, ToneOn},
    timing::ManualClock,
    tones::TONE_TABLE,
    Ensemble, MAX_BLOCK_SIZE,
};

const SAMPLE_RATE: f32 = 48_000.0;

/// Render `seconds` of audio in callback-sized blocks.
fn render_seconds(engine: &ClickEngine, seconds: f32) -> Vec<f32> {
    let total = (seconds * SAMPLE_RATE) as usize;
    let mut out = vec![0.0; total];
    let bank = engine.bank();
    let mut bank = bank.lock().unwrap();
    for block in out.chunks_mut(MAX_BLOCK_SIZE) {
        bank.render_block(block);
    }
    out
}

#[test]
fn handle_reports_every_beat() {
    let mut engine = ClickEngine::new(SAMPLE_RATE);
    let mut handle = engine.create_handle().unwrap();
    let (tx, mut rx) = RingBuffer::new(16);
    handle.subscribe_tone_on(tx);

    handle.play(120.0, &TONE_TABLE[0]).unwrap();
    let audio = render_seconds(&engine, 2.0);

    // Beats at 0, 0.5, 1.0 and 1.5 s
    let mut beats = Vec::new();
    while let Ok(ToneOn { beat }) = rx.pop() {
        beats.push(beat);
    }
    assert_eq!(beats, vec![1, 2, 3, 4]);
    assert!(audio.iter().any(|s| s.abs() > 0.0));
    assert!(audio.iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn silenced_handle_goes_quiet() {
    let mut engine = ClickEngine::new(SAMPLE_RATE);
    let mut handle = engine.create_handle().unwrap();
    handle.play(60.0, &TONE_TABLE[3]).unwrap();
    render_seconds(&engine, 0.5);

    handle.silence().unwrap();
    let audio = render_seconds(&engine, 2.0);
    assert!(audio.iter().all(|&s| s == 0.0));
}

#[test]
fn dropping_a_handle_frees_its_slot() {
    let mut engine = ClickEngine::new(SAMPLE_RATE);
    let first = engine.create_handle().unwrap();
    let second = engine.create_handle().unwrap();
    assert_eq!(engine.bank().lock().unwrap().claimed_slots(), 2);

    let freed = first.slot();
    drop(first);
    assert_eq!(engine.bank().lock().unwrap().claimed_slots(), 1);

    let third = engine.create_handle().unwrap();
    assert_eq!(third.slot(), freed);
    assert_ne!(third.slot(), second.slot());
}

#[test]
fn rejects_non_positive_tempo() {
    let mut engine = ClickEngine::new(SAMPLE_RATE);
    let mut handle = engine.create_handle().unwrap();
    assert!(handle.play(0.0, &TONE_TABLE[0]).is_err());
    assert!(handle.play(f64::NAN, &TONE_TABLE[0]).is_err());
}

#[test]
fn ensemble_downbeat_follows_the_reference_click() {
    let engine = ClickEngine::new(SAMPLE_RATE);
    let bank = engine.bank();
    let clock = ManualClock::new(0.0);
    let mut ensemble = Ensemble::with_clock(engine, clock.clone());

    ensemble.configure(3, 60.0, 1.0).unwrap();
    ensemble.start().unwrap();
    assert_eq!(bank.lock().unwrap().playing_slots(), 3);

    // Nothing rendered yet, so no tone-on
    assert!(!ensemble.on_tick().unwrap().unwrap().downbeat);

    let mut block = vec![0.0; 256];
    bank.lock().unwrap().render_block(&mut block);
    assert!(ensemble.on_tick().unwrap().unwrap().downbeat);

    ensemble.stop().unwrap();
    let bank = bank.lock().unwrap();
    assert_eq!(bank.playing_slots(), 0);
    assert_eq!(bank.claimed_slots(), 0);
}
