use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::rc::Rc;

use crate::error::{AssetKind, EngineError};
use crate::event::{EventChannel, ListenerId};

use super::loader::{settle_all, PendingLoad};
use super::{AssetSource, LoadReport};

/// Decoded PCM audio, interleaved, normalized to `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundClip {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl SoundClip {
    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate.max(1) as f32
    }
}

/// Per-sound playback settings.
///
/// Loop points are in seconds; the sound loops when `loop_start` is set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SoundOptions {
    pub volume: f32,
    pub loop_start: Option<f32>,
    pub loop_end: Option<f32>,
}

impl SoundOptions {
    pub fn looping(&self) -> bool {
        self.loop_start.is_some()
    }
}

impl Default for SoundOptions {
    fn default() -> Self {
        Self { volume: 1.0, loop_start: None, loop_end: None }
    }
}

/// Audio device seam supplied by the host.
pub trait AudioOutput {
    /// Starts `clip` from its beginning under `name`.
    fn start(&mut self, name: &str, clip: Rc<SoundClip>, options: &SoundOptions);
    /// Stops the voice started under `name`, if any.
    fn stop(&mut self, name: &str);
}

fn decode_wav(name: &str, bytes: &[u8]) -> Result<SoundClip, EngineError> {
    let fail = |e: hound::Error| EngineError::AssetLoad { name: name.to_owned(), reason: e.to_string() };

    let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(fail)?;
    let spec = reader.spec();

    let samples: Result<Vec<f32>, _> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect(),
        hound::SampleFormat::Int => {
            let max_value = (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader.samples::<i32>().map(|s| s.map(|v| v as f32 / max_value)).collect()
        }
    };

    Ok(SoundClip { samples: samples.map_err(fail)?, channels: spec.channels, sample_rate: spec.sample_rate })
}

struct Sound {
    clip: Rc<SoundClip>,
    options: SoundOptions,
    playing: bool,
}

/// Named sounds plus the output they play through.
///
/// Sounds may be loaded before the output exists; playback requires
/// [`SoundRegistry::init`]. `init` is emitted once the output is installed.
#[derive(Default)]
pub struct SoundRegistry {
    sounds: HashMap<String, Sound>,
    pending: Vec<PendingLoad<SoundClip>>,
    pending_options: HashMap<String, SoundOptions>,
    output: Option<Box<dyn AudioOutput>>,
    events: EventChannel<()>,
}

impl SoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading and decoding a WAV source in the background.
    pub fn add(&mut self, name: &str, source: impl Into<AssetSource>, options: SoundOptions) {
        if self.sounds.contains_key(name) || self.pending_options.contains_key(name) {
            log::debug!("sound '{name}' already registered");
            return;
        }
        self.pending_options.insert(name.to_owned(), options);
        self.pending.push(PendingLoad::spawn(name, source.into(), decode_wav));
    }

    /// Registers an already-decoded clip, replacing any previous entry.
    pub fn insert(&mut self, name: &str, clip: SoundClip, options: SoundOptions) {
        self.sounds.insert(name.to_owned(), Sound { clip: Rc::new(clip), options, playing: false });
    }

    /// Waits for every pending load.
    pub fn load_all(&mut self) -> LoadReport {
        let pending = std::mem::take(&mut self.pending);
        let mut options = std::mem::take(&mut self.pending_options);
        let sounds = &mut self.sounds;
        settle_all(pending, "sound", |name, clip| {
            let opts = options.remove(&name).unwrap_or_default();
            sounds.insert(name, Sound { clip: Rc::new(clip), options: opts, playing: false });
        })
    }

    /// Installs the audio output and emits `init`.
    pub fn init(&mut self, output: Box<dyn AudioOutput>) {
        self.output = Some(output);
        log::debug!("sound output initialized");
        self.events.emit("init", &());
    }

    pub fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    /// Runs `listener` the next time the output is installed.
    pub fn on_init(&self, listener: impl Fn() + 'static) -> ListenerId {
        self.events.once("init", move |_| listener())
    }

    /// Plays `name` from the start, restarting it if already playing.
    pub fn play(&mut self, name: &str) {
        let Some(sound) = self.sounds.get_mut(name) else {
            log::error!("sound not found: {name}");
            return;
        };
        let Some(output) = self.output.as_mut() else {
            log::error!("audio output not initialized; cannot play '{name}'");
            return;
        };
        if sound.playing {
            output.stop(name);
        }
        sound.playing = true;
        output.start(name, Rc::clone(&sound.clip), &sound.options);
    }

    pub fn stop(&mut self, name: &str) {
        let Some(sound) = self.sounds.get_mut(name) else {
            log::error!("sound not found: {name}");
            return;
        };
        sound.playing = false;
        if let Some(output) = self.output.as_mut() {
            output.stop(name);
        }
    }

    /// True from `play` until `stop`.
    pub fn is_playing(&self, name: &str) -> bool {
        self.sounds.get(name).is_some_and(|s| s.playing)
    }

    pub fn clip(&self, name: &str) -> Option<Rc<SoundClip>> {
        self.sounds.get(name).map(|s| Rc::clone(&s.clip))
    }

    pub fn require(&self, name: &str) -> Result<Rc<SoundClip>, EngineError> {
        self.clip(name).ok_or_else(|| EngineError::MissingAsset {
            kind: AssetKind::Sound,
            name: name.to_owned(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn clear(&mut self) {
        if let Some(output) = self.output.as_mut() {
            for (name, sound) in &self.sounds {
                if sound.playing {
                    output.stop(name);
                }
            }
        }
        self.sounds.clear();
    }
}

impl fmt::Debug for SoundRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundRegistry")
            .field("sounds", &self.sounds.len())
            .field("pending", &self.pending.len())
            .field("initialized", &self.output.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    fn wav_bytes(samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in samples {
                writer.write_sample(*s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl AudioOutput for Recorder {
        fn start(&mut self, name: &str, _clip: Rc<SoundClip>, _options: &SoundOptions) {
            self.log.borrow_mut().push(format!("start {name}"));
        }

        fn stop(&mut self, name: &str) {
            self.log.borrow_mut().push(format!("stop {name}"));
        }
    }

    fn beep() -> SoundClip {
        SoundClip { samples: vec![0.0; 80], channels: 1, sample_rate: 8000 }
    }

    // ── decoding ──────────────────────────────────────────────────────────

    #[test]
    fn wav_samples_are_normalized() {
        let clip = decode_wav("t", &wav_bytes(&[0, 16384, -32768])).unwrap();
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.sample_rate, 8000);
        assert_eq!(clip.samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn load_all_keeps_options() {
        let mut sounds = SoundRegistry::new();
        let opts = SoundOptions { volume: 0.3, loop_start: Some(0.0), loop_end: Some(1.0) };
        sounds.add("bgm", wav_bytes(&[1, 2, 3, 4]), opts);
        sounds.add("bad", vec![1, 2, 3], SoundOptions::default());

        let report = sounds.load_all();
        assert_eq!(report, LoadReport { loaded: 1, failed: 1 });
        assert_eq!(sounds.clip("bgm").unwrap().frames(), 4);
        assert!(sounds.sounds["bgm"].options.looping());
    }

    #[test]
    fn require_reports_missing_sounds() {
        let mut sounds = SoundRegistry::new();
        sounds.insert("beep", beep(), SoundOptions::default());
        assert_eq!(sounds.require("beep").unwrap().frames(), 80);

        let err = sounds.require("boom").unwrap_err();
        assert!(matches!(err, EngineError::MissingAsset { kind: AssetKind::Sound, .. }));
        assert_eq!(err.to_string(), "sound asset 'boom' is not loaded");
    }

    // ── playback ──────────────────────────────────────────────────────────

    #[test]
    fn play_before_init_is_a_noop() {
        let mut sounds = SoundRegistry::new();
        sounds.insert("beep", beep(), SoundOptions::default());
        sounds.play("beep");
        assert!(!sounds.is_playing("beep"));
    }

    #[test]
    fn play_restarts_a_playing_sound() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sounds = SoundRegistry::new();
        sounds.insert("beep", beep(), SoundOptions::default());
        sounds.init(Box::new(Recorder { log: Rc::clone(&log) }));

        sounds.play("beep");
        sounds.play("beep");
        sounds.stop("beep");

        assert_eq!(*log.borrow(), vec!["start beep", "stop beep", "start beep", "stop beep"]);
        assert!(!sounds.is_playing("beep"));
    }

    #[test]
    fn unknown_sound_is_ignored() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sounds = SoundRegistry::new();
        sounds.init(Box::new(Recorder { log: Rc::clone(&log) }));
        sounds.play("nope");
        sounds.stop("nope");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn on_init_fires_once() {
        let hits = Rc::new(Cell::new(0));
        let mut sounds = SoundRegistry::new();
        let h = Rc::clone(&hits);
        sounds.on_init(move || h.set(h.get() + 1));

        sounds.init(Box::new(Recorder::default()));
        sounds.init(Box::new(Recorder::default()));
        assert_eq!(hits.get(), 1);
    }
}
