//! Sound hook
//!
//! The simulation only emits [`SoundEffect`] events. The host drains them
//! once per frame and hands them to a [`SoundSink`]: procedurally generated
//! Web Audio tones in the browser, nothing anywhere else.

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Weapon fired
    Fire,
    /// Weapon slot changed
    WeaponSwitch,
    /// Body torn apart
    Splat,
    /// Knife cut through an enemy
    Slash,
    /// Explosion spawned
    Explosion,
    /// Wrecking ball hit the floor
    Shatter,
    /// Enemy converted into an ally
    Convert,
}

/// Anything that can play sound effects
pub trait SoundSink {
    fn play(&mut self, effect: SoundEffect);

    /// Volume/mute changes from the settings panel
    fn apply_settings(&mut self, _settings: &Settings) {}
}

/// Silent sink for native builds and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl SoundSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, SoundSink};
    use crate::settings::Settings;

    /// Web Audio sink; silently disabled when no AudioContext is available
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::debug!("No AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: Settings::default().effective_volume(),
            }
        }

        /// Resume the context (browsers require a user gesture first)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator routed through its own gain node
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single tone with a pitch sweep and exponential decay
        fn sweep(
            &self,
            ctx: &AudioContext,
            osc_type: OscillatorType,
            from_hz: f32,
            to_hz: f32,
            level: f32,
            length: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, from_hz, osc_type) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.frequency().set_value_at_time(from_hz, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to_hz, t + length)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        /// Gun report - short bright crack over a low punch
        fn play_fire(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, OscillatorType::Square, 900.0, 200.0, vol * 0.15, 0.06);
            self.sweep(ctx, OscillatorType::Sine, 120.0, 50.0, vol * 0.3, 0.08);
        }

        /// Weapon switch - two quick clicks
        fn play_switch(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [700.0, 1000.0].iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * 0.05;
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.04)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.06).ok();
            }
        }

        /// Wet splat - falling sawtooth with a wobble
        fn play_splat(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency().set_value_at_time(140.0, t + 0.04).ok();
            osc.frequency().set_value_at_time(180.0, t + 0.08).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.25)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        /// Blade swish - rising then falling hiss
        fn play_slash(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.01, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.15, t + 0.03)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(1500.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(4000.0, t + 0.05)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(800.0, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }

        /// Explosion - boom with a crack on top
        fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, OscillatorType::Sawtooth, 100.0, 30.0, vol * 0.5, 0.4);
            self.sweep(ctx, OscillatorType::Square, 1500.0, 400.0, vol * 0.15, 0.1);
        }

        /// Floor impact - deep thud and rumble
        fn play_shatter(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, OscillatorType::Sine, 80.0, 25.0, vol * 0.6, 0.35);
            self.sweep(ctx, OscillatorType::Triangle, 300.0, 90.0, vol * 0.2, 0.2);
        }

        /// Conversion - shimmering rising chord
        fn play_convert(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [523.0, 659.0, 784.0, 1046.0].iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * 0.06;
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.35).ok();
            }
        }
    }

    impl SoundSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Fire => self.play_fire(ctx, vol),
                SoundEffect::WeaponSwitch => self.play_switch(ctx, vol),
                SoundEffect::Splat => self.play_splat(ctx, vol),
                SoundEffect::Slash => self.play_slash(ctx, vol),
                SoundEffect::Explosion => self.play_explosion(ctx, vol),
                SoundEffect::Shatter => self.play_shatter(ctx, vol),
                SoundEffect::Convert => self.play_convert(ctx, vol),
            }
        }

        fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume().clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        played: Vec<SoundEffect>,
    }

    impl SoundSink for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.played.push(effect);
        }
    }

    #[test]
    fn test_null_audio_accepts_everything() {
        let mut sink = NullAudio;
        sink.play(SoundEffect::Explosion);
        sink.apply_settings(&Settings::default());
    }

    #[test]
    fn test_sink_is_object_safe() {
        let mut sinks: Vec<Box<dyn SoundSink>> = vec![Box::new(NullAudio), Box::new(Recorder::default())];
        for sink in &mut sinks {
            sink.play(SoundEffect::Fire);
        }
    }

    #[test]
    fn test_recorder_sees_drained_sounds() {
        let mut state = crate::sim::GameState::new(1, 800.0, 600.0);
        crate::sim::weapon::fire(&mut state, glam::Vec2::new(400.0, 500.0));
        let mut sink = Recorder::default();
        for event in state.drain_events() {
            if let crate::sim::GameEvent::Sound(effect) = event {
                sink.play(effect);
            }
        }
        assert_eq!(sink.played, vec![SoundEffect::Fire]);
    }
}
