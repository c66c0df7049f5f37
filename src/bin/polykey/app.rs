//! Polykey - wires the engine to the sound card and the terminal

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use polykey::io::{
    disable_key_releases, enable_key_releases, meter, AudioOutput, KeyAction, KeyboardState,
    MeterReader,
};
use polykey::synth::{InstrumentKind, Note};
use polykey::{SynthConfig, SynthEngine};

use super::ui::{self, Status};

/// Redraw period of the status screen (~60fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Extra time allowed on exit after the longest release tail.
const RELEASE_MARGIN: f64 = 0.1;

pub struct Polykey {
    config: SynthConfig,
    instrument: InstrumentKind,
}

impl Polykey {
    pub fn new(config: SynthConfig, instrument: InstrumentKind) -> Self {
        Self { config, instrument }
    }

    /// Open the device and play until Esc / Ctrl-C.
    pub fn run(self, host: &cpal::Host, device_name: &str) -> EyreResult<()> {
        let engine = Arc::new(SynthEngine::new(&self.config));

        let settings = &self.config.output;
        // one peak per device buffer, ring deep enough for the whole latency
        let window = settings.samples_per_buffer as usize;
        let (mut tap, meter) = meter(settings.latency_frames() / window, window);

        let render_engine = Arc::clone(&engine);
        let output = AudioOutput::open(host, device_name, settings, move |channel, time| {
            let sample = render_engine.render(channel, time);
            if channel == 0 {
                tap.observe(sample);
            }
            sample
        })
        .wrap_err_with(|| format!("failed to open output device {device_name}"))?;

        // Key releases have to be requested before the alternate screen.
        let releases = enable_key_releases()?;
        let mut terminal = ratatui::init();
        let played = self.play(&mut terminal, &engine, &output, meter, releases);

        self.fade_out(&engine, output.current_time());
        drop(output);

        ratatui::restore();
        if releases {
            disable_key_releases()?;
        }
        played
    }

    fn play(
        &self,
        terminal: &mut DefaultTerminal,
        engine: &SynthEngine,
        output: &AudioOutput,
        mut meter: MeterReader,
        releases: bool,
    ) -> EyreResult<()> {
        let mut keyboard = KeyboardState::new(self.config.layout.clone(), self.config.hold_timeout)
            .with_release_events(releases);
        let mut notes: Vec<Note> = Vec::new();
        let mut last_draw: Option<Instant> = None;

        loop {
            if event::poll(self.config.poll_interval)? {
                if let Event::Key(key) = event::read()? {
                    if keyboard.handle(&key, output.current_time()) == KeyAction::Quit {
                        return Ok(());
                    }
                }
            }

            let now = output.current_time();
            keyboard.expire(now);
            engine.poll_keys(&keyboard, now);

            if last_draw.map_or(true, |at| at.elapsed() >= FRAME_INTERVAL) {
                engine.snapshot_into(&mut notes);
                let status = Status {
                    device: output.device_name(),
                    settings: output.settings(),
                    instrument: self.instrument,
                    layout: keyboard.layout(),
                    notes: &notes,
                    time: now,
                    level: meter.poll(),
                    releases: keyboard.reports_releases(),
                };
                terminal.draw(|frame| ui::render(frame, &status))?;
                last_draw = Some(Instant::now());
            }
        }
    }

    /// Release everything and let the tails ring out before the stream
    /// is dropped.
    fn fade_out(&self, engine: &SynthEngine, now: f64) {
        engine.all_notes_off(now);

        // Wall clock: if the device stalls, audio time stops advancing.
        let started = Instant::now();
        let budget = Duration::from_secs_f64(engine.router().longest_release() + RELEASE_MARGIN);

        while engine.note_count() > 0 && started.elapsed() < budget {
            thread::sleep(self.config.poll_interval);
        }
        tracing::debug!(remaining = engine.note_count(), "shutdown");
    }
}
