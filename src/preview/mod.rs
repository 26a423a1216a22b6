//! Fixed-timestep playback over the frame collection.

use crate::model::AnimationControls;

#[derive(Debug, Clone, Default)]
pub struct Animator {
    current: usize,
    /// Seconds not yet spent on a frame advance
    accumulator: f64,
    playing: bool,
    /// Rate captured when playback started
    fps: f64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_frame_index(&self) -> usize {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_at_last_frame(&self, frame_count: usize) -> bool {
        frame_count > 0 && self.current + 1 >= frame_count
    }

    fn start(&mut self, fps: f64) {
        self.accumulator = 0.0;
        self.fps = fps;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.accumulator = 0.0;
    }

    /// Advance by `dt` seconds. Returns whether the shown frame changed.
    pub fn update(&mut self, dt: f64, frame_count: usize, controls: &mut AnimationControls) -> bool {
        if frame_count == 0 || !controls.play {
            self.playing = false;
            return false;
        }
        if !self.playing {
            self.start(controls.frame_rate);
        } else if controls.frame_rate != self.fps {
            self.stop();
            controls.play = false;
            return false;
        }
        if self.fps <= 0.0 {
            return false;
        }
        self.clamp_to(frame_count);
        self.accumulator += dt;

        let mut changed = false;
        while self.accumulator * self.fps >= 1.0 {
            if !controls.looping && self.current + 1 >= frame_count {
                self.stop();
                controls.play = false;
                return changed;
            }
            self.current = (self.current + 1) % frame_count;
            self.accumulator -= 1.0 / self.fps;
            changed = true;
        }
        changed
    }

    /// Manual stepping, wraps around. Ignored while playing.
    pub fn step(&mut self, forward: bool, frame_count: usize, controls: &AnimationControls) -> bool {
        if controls.play || frame_count == 0 {
            return false;
        }
        self.current = if forward {
            (self.current + 1) % frame_count
        } else {
            (self.current + frame_count - 1) % frame_count
        };
        true
    }

    pub fn restart(&mut self) {
        self.current = 0;
        self.accumulator = 0.0;
    }

    pub fn jump_to(&mut self, index: usize) {
        self.current = index;
        self.accumulator = 0.0;
    }

    /// Called after frames were removed
    pub fn clamp_to(&mut self, frame_count: usize) {
        if self.current >= frame_count {
            self.current = 0;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls(looping: bool) -> AnimationControls {
        AnimationControls {
            looping,
            ..AnimationControls::default()
        }
    }

    #[test]
    fn test_advances_once_per_interval() {
        let mut animator = Animator::new();
        let mut controls = controls(true);
        assert!(!animator.update(0.05, 3, &mut controls));
        assert!(animator.update(0.05, 3, &mut controls));
        assert_eq!(animator.current_frame_index(), 1);
        assert!(animator.update(0.25, 3, &mut controls));
        assert_eq!(animator.current_frame_index(), 0);
    }

    #[test]
    fn test_non_looping_stops_after_last_frame_interval() {
        let mut animator = Animator::new();
        let mut controls = controls(false);
        animator.update(0.1, 3, &mut controls);
        animator.update(0.1, 3, &mut controls);
        assert_eq!(animator.current_frame_index(), 2);
        assert!(controls.play);

        animator.update(0.05, 3, &mut controls);
        assert!(controls.play);
        animator.update(0.05, 3, &mut controls);
        assert!(!controls.play);
        assert!(!animator.is_playing());
        assert_eq!(animator.current_frame_index(), 2);

        assert!(!animator.update(1.0, 3, &mut controls));
        assert_eq!(animator.current_frame_index(), 2);
    }

    #[test]
    fn test_rate_change_while_playing_stops() {
        let mut animator = Animator::new();
        let mut controls = controls(true);
        animator.update(0.01, 3, &mut controls);
        controls.set_frame_rate(24.0).unwrap();
        assert!(!animator.update(0.1, 3, &mut controls));
        assert!(!controls.play);

        controls.play = true;
        animator.update(0.05, 3, &mut controls);
        assert_eq!(animator.current_frame_index(), 1);
    }

    #[test]
    fn test_step_only_while_paused() {
        let mut animator = Animator::new();
        let mut controls = controls(true);
        assert!(!animator.step(true, 3, &controls));

        controls.play = false;
        assert!(animator.step(false, 3, &controls));
        assert_eq!(animator.current_frame_index(), 2);
        assert!(animator.step(true, 3, &controls));
        assert_eq!(animator.current_frame_index(), 0);
    }

    #[test]
    fn test_jump_and_clamp() {
        let mut animator = Animator::new();
        animator.jump_to(4);
        assert_eq!(animator.current_frame_index(), 4);
        animator.clamp_to(5);
        assert_eq!(animator.current_frame_index(), 4);
        animator.clamp_to(4);
        assert_eq!(animator.current_frame_index(), 0);
    }

    #[test]
    fn test_no_frames_never_plays() {
        let mut animator = Animator::new();
        let mut controls = controls(true);
        assert!(!animator.update(10.0, 0, &mut controls));
        assert!(!animator.is_playing());
        assert!(controls.play);
    }
}
