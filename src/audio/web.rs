//! Web Audio API backend

use rand_pcg::Pcg32;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    AudioBufferSourceNode, AudioContext, AudioNode, BiquadFilterNode, BiquadFilterType, GainNode,
    OscillatorNode, OscillatorType,
};

use super::{AmbientGraph, AudioBackend, AudioError, synthesize_noise};
use crate::settings::{AudioSettings, PulseSettings};

fn node_err(what: &str, e: wasm_bindgen::JsValue) -> AudioError {
    AudioError::Node(format!("{what}: {e:?}"))
}

/// Builds ambient graphs on a fresh `AudioContext`
#[derive(Debug, Default, Clone, Copy)]
pub struct WebAudioBackend;

/// One encounter pulse: oscillator, envelope gain, bus
struct PulseVoice {
    osc: OscillatorNode,
    gain: GainNode,
    bus: GainNode,
}

impl PulseVoice {
    fn disconnect(&self) {
        let nodes: [&AudioNode; 3] = [&self.osc, &self.gain, &self.bus];
        for node in nodes {
            node.disconnect().ok();
        }
    }
}

/// Live ambient graph; dropping it without `release` leaks the context
pub struct WebAmbientGraph {
    ctx: AudioContext,
    master: GainNode,
    noise: AudioBufferSourceNode,
    filter: BiquadFilterNode,
    drone: OscillatorNode,
    drone_gain: GainNode,
    pulses: Vec<PulseVoice>,
}

impl WebAudioBackend {
    /// Create an oscillator with its own gain, wired into `dest`
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        gain_value: f32,
        dest: &AudioNode,
    ) -> Result<(OscillatorNode, GainNode), AudioError> {
        let osc = ctx
            .create_oscillator()
            .map_err(|e| node_err("oscillator", e))?;
        let gain = ctx.create_gain().map_err(|e| node_err("gain", e))?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        gain.gain().set_value(gain_value);
        osc.connect_with_audio_node(&gain)
            .map_err(|e| node_err("connect oscillator", e))?;
        gain.connect_with_audio_node(dest)
            .map_err(|e| node_err("connect oscillator gain", e))?;

        Ok((osc, gain))
    }

    fn build(
        ctx: AudioContext,
        params: &AudioSettings,
        rng: &mut Pcg32,
    ) -> Result<WebAmbientGraph, AudioError> {
        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let master = ctx.create_gain().map_err(|e| node_err("master gain", e))?;
        master.gain().set_value(params.master_gain);
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| node_err("connect master", e))?;

        // Noise bed
        let sample_rate = ctx.sample_rate();
        let samples = synthesize_noise(sample_rate, params, rng);
        let buffer = ctx
            .create_buffer(1, samples.len() as u32, sample_rate)
            .map_err(|e| node_err("noise buffer", e))?;
        buffer
            .copy_to_channel(&samples, 0)
            .map_err(|e| node_err("fill noise buffer", e))?;

        let noise = ctx
            .create_buffer_source()
            .map_err(|e| node_err("buffer source", e))?;
        noise.set_buffer(Some(&buffer));
        noise.set_loop(true);

        let filter = ctx
            .create_biquad_filter()
            .map_err(|e| node_err("bandpass", e))?;
        filter.set_type(BiquadFilterType::Bandpass);
        filter.frequency().set_value(params.filter_frequency);
        filter.q().set_value(params.filter_q);

        noise
            .connect_with_audio_node(&filter)
            .map_err(|e| node_err("connect noise", e))?;
        filter
            .connect_with_audio_node(&master)
            .map_err(|e| node_err("connect bandpass", e))?;
        noise.start().map_err(|e| node_err("start noise", e))?;

        // Near-silent drone under the bed
        let (drone, drone_gain) =
            Self::create_osc(&ctx, params.drone_frequency, params.drone_gain, &master)?;
        drone.start().map_err(|e| node_err("start drone", e))?;

        log::debug!(
            "Ambient bed: {} samples at {} Hz",
            samples.len(),
            sample_rate
        );

        Ok(WebAmbientGraph {
            ctx,
            master,
            noise,
            filter,
            drone,
            drone_gain,
            pulses: Vec::new(),
        })
    }
}

impl AudioBackend for WebAudioBackend {
    type Graph = WebAmbientGraph;

    fn acquire(&mut self, params: &AudioSettings, rng: &mut Pcg32) -> Result<WebAmbientGraph, AudioError> {
        // May fail outside a secure context or without an audio device
        let ctx = AudioContext::new().map_err(|e| AudioError::Unavailable(format!("{e:?}")))?;
        let closer = ctx.clone();
        Self::build(ctx, params, rng).inspect_err(|_| {
            let _ = closer.close();
        })
    }
}

impl AmbientGraph for WebAmbientGraph {
    /// Swelling sine through its own bus; the oscillator stops itself on the
    /// audio clock and its `ended` event disconnects the voice
    fn pulse(&mut self, p: &PulseSettings) -> Result<(), AudioError> {
        let ctx = &self.ctx;
        let bus = ctx.create_gain().map_err(|e| node_err("pulse bus", e))?;
        bus.gain().set_value(p.bus_gain);
        bus.connect_with_audio_node(&self.master)
            .map_err(|e| node_err("connect pulse bus", e))?;

        let (osc, gain) = WebAudioBackend::create_osc(ctx, p.frequency, p.start_gain, &bus)?;
        let t = ctx.current_time();

        gain.gain().set_value_at_time(p.start_gain, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(p.peak_gain, t + p.attack)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(p.floor_gain, t + p.release)
            .ok();

        let voice = PulseVoice { osc, gain, bus };
        if let Err(e) = voice.osc.start() {
            voice.disconnect();
            return Err(node_err("start pulse", e));
        }
        voice.osc.stop_with_when(t + p.stop_after).ok();

        let finished = PulseVoice {
            osc: voice.osc.clone(),
            gain: voice.gain.clone(),
            bus: voice.bus.clone(),
        };
        let on_ended = Closure::once_into_js(move || {
            finished.disconnect();
            finished.osc.set_onended(None);
        });
        voice.osc.set_onended(Some(on_ended.unchecked_ref()));

        // Ended voices are already disconnected; keep the rest for `release`
        self.pulses.retain(|v| v.osc.onended().is_some());
        self.pulses.push(voice);
        Ok(())
    }

    fn release(self) {
        for voice in &self.pulses {
            voice.osc.stop().ok();
            voice.disconnect();
        }
        self.noise.stop().ok();
        self.drone.stop().ok();
        let nodes: [&AudioNode; 5] = [
            &self.noise,
            &self.filter,
            &self.drone,
            &self.drone_gain,
            &self.master,
        ];
        for node in nodes {
            node.disconnect().ok();
        }
        let _ = self.ctx.close();
    }
}
