//! Polymetro - application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::ui::UiApp;

use polymetro::{
    sound::{ClickEngine, SilentEngine, SoundEngine},
    Ensemble, EnsembleConfig, MAX_BLOCK_SIZE,
};

/// Main application builder
pub struct Polymetro {
    config: EnsembleConfig,
    mute: bool,
}

impl Polymetro {
    pub fn new(config: EnsembleConfig) -> Self {
        Self {
            config,
            mute: false,
        }
    }

    /// Skip the audio device and run visuals only
    pub fn mute(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        // Catch bad settings before touching the audio device
        self.config
            .validate()
            .wrap_err("invalid ensemble configuration")?;

        if self.mute {
            log::info!("running muted");
            return run_ui(Ensemble::new(SilentEngine), self.config);
        }

        // Set up audio
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available (try --mute)"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!("audio output: {} Hz, {} channels", sample_rate, channels);

        let engine = ClickEngine::new(sample_rate);
        let bank = engine.bank();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let Ok(mut bank) = bank.lock() else {
                    data.fill(0.0);
                    return;
                };
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    bank.render_block(block);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        // The stream keeps playing until it is dropped at the end of this scope
        run_ui(Ensemble::new(engine), self.config)
    }
}

fn run_ui<E: SoundEngine>(mut ensemble: Ensemble<E>, config: EnsembleConfig) -> EyreResult<()> {
    ensemble
        .configure_with(config)
        .wrap_err("invalid ensemble configuration")?;
    ensemble.start().wrap_err("failed to start voices")?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(ensemble).run(&mut terminal);
    ratatui::restore();
    result
}
