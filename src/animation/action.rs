use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Wrap around at the end of the clip.
    Loop,
    /// Play once and hold the final pose.
    ClampOnce,
}

/// A linear weight ramp between `from` and `to` over `duration` seconds.
#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl Fade {
    fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Playback state of one clip on one character.
///
/// The effective blend weight is `weight * fade_weight`; fades move
/// `fade_weight` and keep running while the action is paused, so a crossfade
/// completes even when time is frozen.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    fade_weight: f32,
    fade: Option<Fade>,
    running: bool,
    finished: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            fade_weight: 1.0,
            fade: None,
            running: false,
            finished: false,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    /// Rewinds to the start and clears pause, finish and any fade.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.paused = false;
        self.finished = false;
        self.enabled = true;
        self.fade = None;
        self.fade_weight = 1.0;
        for cursor in &mut self.track_cursors {
            cursor.last_index = 0;
        }
        self
    }

    pub fn play(&mut self) -> &mut Self {
        self.enabled = true;
        self.running = true;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self.fade = None;
        self
    }

    /// Ramps the blend weight from 0 to 1 over `duration` seconds.
    pub fn fade_in(&mut self, duration: f32) -> &mut Self {
        self.start_fade(0.0, 1.0, duration);
        self
    }

    /// Ramps the blend weight from its current value to 0 over `duration`
    /// seconds, then stops the action.
    pub fn fade_out(&mut self, duration: f32) -> &mut Self {
        self.start_fade(self.fade_weight, 0.0, duration);
        self
    }

    fn start_fade(&mut self, from: f32, to: f32, duration: f32) {
        self.fade_weight = from;
        self.fade = Some(Fade {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
        });
    }

    /// Switching back to [`LoopMode::Loop`] resumes a clip that finished
    /// under [`LoopMode::ClampOnce`].
    pub fn set_loop(&mut self, mode: LoopMode) -> &mut Self {
        if mode == LoopMode::Loop {
            self.finished = false;
        }
        self.loop_mode = mode;
        self
    }

    pub fn set_paused(&mut self, paused: bool) -> &mut Self {
        self.paused = paused;
        self
    }

    // ========================================================================
    // State queries
    // ========================================================================

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running && self.enabled
    }

    /// True once a [`LoopMode::ClampOnce`] action reached the end of its clip.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    #[must_use]
    pub fn fade_weight(&self) -> f32 {
        self.fade_weight
    }

    /// Weight this action contributes to the blend this frame.
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        if self.is_running() {
            self.weight * self.fade_weight
        } else {
            0.0
        }
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advances the fade, then the clip time.
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        self.update_fade(dt);
        if !self.running || self.paused || self.finished {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::ClampOnce => {
                if self.time >= duration {
                    self.time = duration;
                    self.finished = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.finished = true;
                }
            }
            LoopMode::Loop => {
                if self.time >= duration {
                    self.time %= duration;
                } else if self.time < 0.0 {
                    self.time = duration + (self.time % duration);
                }
            }
        }
    }

    fn update_fade(&mut self, dt: f32) {
        let Some(fade) = &mut self.fade else {
            return;
        };
        fade.elapsed += dt;
        self.fade_weight = fade.value();

        if fade.is_done() {
            let faded_out = fade.to <= 0.0;
            self.fade = None;
            if faded_out {
                self.running = false;
                self.enabled = false;
            }
        }
    }

    /// Samples track `track_index` at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(self.time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => t
                .sample_with_cursor(self.time, cursor)
                .map(TrackValue::Quaternion),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}
