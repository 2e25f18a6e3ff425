use std::collections::HashMap;

use crate::actor::{Actor, StepCtx};
use crate::coords::Rect;
use crate::error::EngineError;

use super::{ActorTrait, TraitKind, TraitTag};

/// Named sequence of source rectangles.
///
/// `frame_rate` is the number of steps each frame is shown for; `0` freezes
/// the animation on its current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimation {
    pub name: String,
    pub frames: Vec<Rect>,
    pub frame_rate: u32,
    pub looping: bool,
}

impl SpriteAnimation {
    pub fn new(name: impl Into<String>, frames: Vec<Rect>, frame_rate: u32) -> Self {
        Self { name: name.into(), frames, frame_rate, looping: false }
    }

    pub fn looped(mut self) -> Self {
        self.looping = true;
        self
    }

    /// `count` equally sized frames laid out left to right from `first`.
    pub fn strip(name: impl Into<String>, first: Rect, count: usize, frame_rate: u32) -> Self {
        let frames = (0..count)
            .map(|i| Rect::new(first.x + first.width * i as f32, first.y, first.width, first.height))
            .collect();
        Self::new(name, frames, frame_rate)
    }
}

/// Flip-book animation for sprite actors.
///
/// Drives the owner's source rectangle. Options are the initial set of
/// animations.
#[derive(Debug, Default)]
pub struct SpriteAnimationTrait {
    animations: HashMap<String, SpriteAnimation>,
    current: Option<String>,
    counter: u32,
    frame: usize,
    playing: bool,
}

impl SpriteAnimationTrait {
    /// Registers `animation`, replacing any with the same name.
    pub fn add(&mut self, animation: SpriteAnimation) -> &mut Self {
        self.animations.insert(animation.name.clone(), animation);
        self
    }

    /// Starts `name`. Unknown names are ignored.
    ///
    /// With `reset` the animation starts from its first frame; otherwise the
    /// counters carry over. The current frame is applied to `owner` at once.
    pub fn play(&mut self, owner: &mut Actor, name: &str, reset: bool) -> &mut Self {
        let Some(animation) = self.animations.get(name) else {
            log::debug!("sprite animation '{name}' is not registered");
            return self;
        };

        if reset {
            self.counter = 0;
            self.frame = 0;
        }
        if self.frame >= animation.frames.len() {
            self.frame = 0;
        }
        self.current = Some(animation.name.clone());
        self.playing = true;
        self.apply(owner);
        self
    }

    /// Pauses on the current frame.
    pub fn stop(&mut self) -> &mut Self {
        self.playing = false;
        self
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn animation(&self) -> Option<&SpriteAnimation> {
        self.current.as_ref().and_then(|name| self.animations.get(name))
    }

    fn apply(&self, owner: &mut Actor) {
        if let Some(rect) = self.animation().and_then(|a| a.frames.get(self.frame)) {
            owner.set_source_rect(*rect);
        }
    }
}

impl ActorTrait for SpriteAnimationTrait {
    fn tag(&self) -> TraitTag {
        Self::TAG
    }

    fn update(&mut self, owner: &mut Actor, _ctx: &mut StepCtx<'_>) {
        if !self.playing {
            return;
        }
        let Some((rate, len, looping)) = self.animation().map(|a| (a.frame_rate, a.frames.len(), a.looping)) else {
            return;
        };
        if rate == 0 {
            return;
        }

        self.counter += 1;
        if self.counter < rate {
            return;
        }
        self.counter = 0;
        self.frame += 1;

        if self.frame >= len {
            if looping {
                self.frame = 0;
            } else {
                self.frame = len.saturating_sub(1);
                self.playing = false;
            }
        }
        self.apply(owner);
    }
}

impl TraitKind for SpriteAnimationTrait {
    const TAG: TraitTag = "sprite-animation";
    type Options = Vec<SpriteAnimation>;

    fn create(owner: &Actor, animations: Self::Options) -> Result<Self, EngineError> {
        if !owner.kind().is_sprite() {
            return Err(EngineError::IncompatibleOwner { tag: Self::TAG, required: "sprite" });
        }
        let mut this = Self::default();
        for animation in animations {
            this.add(animation);
        }
        Ok(this)
    }
}
