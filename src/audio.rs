//! Background track transport
//!
//! The simulation only ever sends fire-and-forget commands and reads the
//! playback position. Implementations: `HtmlAudioTransport` (browser
//! `<audio>` element), `SilentAudio` (no device), `ScriptedAudio` (tests).

use std::cell::RefCell;
use std::rc::Rc;

use crate::{Error, Result};

/// Position must jump back by more than this to count as a wrap
pub const WRAP_BACKSTEP_SECS: f64 = 1.0;

/// Abstraction over the looping music player.
pub trait AudioTransport {
    fn play(&mut self, looping: bool) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    /// Current playback position in seconds, if the track is actually playing
    fn position_secs(&self) -> Option<f64>;
}

/// No audio device: every `play` fails, so rounds use the wall clock.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioTransport for SilentAudio {
    fn play(&mut self, _looping: bool) -> Result<()> {
        Err(Error::AudioUnavailable("no audio output".into()))
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    fn position_secs(&self) -> Option<f64> {
        None
    }
}

/// Edge-triggered loop detection from polled playback positions.
///
/// Fires once when the position moves backwards past `WRAP_BACKSTEP_SECS`;
/// holding near zero afterwards does not fire again.
#[derive(Debug, Clone, Default)]
pub struct LoopWrapDetector {
    last_position: Option<f64>,
}

impl LoopWrapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, position_secs: f64) -> bool {
        let wrapped = matches!(self.last_position, Some(prev) if prev - position_secs > WRAP_BACKSTEP_SECS);
        self.last_position = Some(position_secs);
        wrapped
    }

    pub fn reset(&mut self) {
        self.last_position = None;
    }
}

/// Recorded state of a `ScriptedAudio`
#[derive(Debug, Clone, Default)]
pub struct ScriptedAudioState {
    pub fail_play: bool,
    pub playing: bool,
    pub looping: bool,
    pub position: f64,
    pub play_calls: u32,
    pub pause_calls: u32,
}

/// Test transport whose position is set by hand. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAudio {
    state: Rc<RefCell<ScriptedAudioState>>,
}

impl ScriptedAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose `play` always fails
    pub fn failing() -> Self {
        let audio = Self::new();
        audio.state.borrow_mut().fail_play = true;
        audio
    }

    pub fn set_position(&self, secs: f64) {
        self.state.borrow_mut().position = secs;
    }

    pub fn state(&self) -> ScriptedAudioState {
        self.state.borrow().clone()
    }
}

impl AudioTransport for ScriptedAudio {
    fn play(&mut self, looping: bool) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.play_calls += 1;
        if s.fail_play {
            return Err(Error::AudioCommand("play() rejected".into()));
        }
        s.playing = true;
        s.looping = looping;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.pause_calls += 1;
        s.playing = false;
        Ok(())
    }

    fn position_secs(&self) -> Option<f64> {
        let s = self.state.borrow();
        s.playing.then_some(s.position)
    }
}

/// `<audio>` element transport (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct HtmlAudioTransport {
    element: web_sys::HtmlAudioElement,
}

#[cfg(target_arch = "wasm32")]
impl HtmlAudioTransport {
    pub fn from_element_id(id: &str) -> Result<Self> {
        use wasm_bindgen::JsCast;

        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| Error::AudioUnavailable(format!("no #{} element", id)))?
            .dyn_into::<web_sys::HtmlAudioElement>()
            .map_err(|_| Error::AudioUnavailable(format!("#{} is not an <audio> element", id)))?;
        Ok(Self { element })
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioTransport for HtmlAudioTransport {
    fn play(&mut self, looping: bool) -> Result<()> {
        self.element.set_loop(looping);
        let promise = self
            .element
            .play()
            .map_err(|e| Error::AudioCommand(format!("{:?}", e)))?;
        // Autoplay policy rejections arrive later; the position just stays unavailable
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::error!("Music playback failed: {:?}", e);
            }
        });
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.element
            .pause()
            .map_err(|e| Error::AudioCommand(format!("{:?}", e)))
    }

    fn position_secs(&self) -> Option<f64> {
        (!self.element.paused()).then(|| self.element.current_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_fires_once_per_wrap() {
        let mut d = LoopWrapDetector::new();
        assert!(!d.observe(0.0));
        assert!(!d.observe(90.0));
        assert!(!d.observe(179.9));
        assert!(d.observe(0.02));
        // Still near the start: level stays low, no second edge
        assert!(!d.observe(0.05));
        assert!(!d.observe(0.08));
        assert!(!d.observe(1.0));
    }

    #[test]
    fn test_detector_ignores_small_jitter() {
        let mut d = LoopWrapDetector::new();
        d.observe(50.0);
        assert!(!d.observe(49.7));
        assert!(!d.observe(50.2));
    }

    #[test]
    fn test_detector_reset_forgets_position() {
        let mut d = LoopWrapDetector::new();
        d.observe(100.0);
        d.reset();
        assert!(!d.observe(0.0));
    }

    #[test]
    fn test_silent_audio_refuses_to_play() {
        let mut audio = SilentAudio;
        assert!(audio.play(true).is_err());
        assert!(audio.pause().is_ok());
        assert_eq!(audio.position_secs(), None);
    }

    #[test]
    fn test_scripted_audio_records_commands() {
        let audio = ScriptedAudio::new();
        let mut transport = audio.clone();
        assert_eq!(transport.position_secs(), None);

        transport.play(true).unwrap();
        audio.set_position(12.5);
        assert_eq!(transport.position_secs(), Some(12.5));

        transport.pause().unwrap();
        let state = audio.state();
        assert!(state.looping);
        assert!(!state.playing);
        assert_eq!((state.play_calls, state.pause_calls), (1, 1));
    }
}
