//! Prompt blink duty cycle.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blink {
    on_frames: u32,
    off_frames: u32,
    start_hidden: bool,
}

impl Blink {
    pub fn new(on_frames: u32, off_frames: u32, start_hidden: bool) -> Self {
        Blink {
            on_frames,
            off_frames,
            start_hidden,
        }
    }

    /// Whether the prompt shows `frame` frames after entering the title.
    ///
    /// Visible for the first `on_frames` of each cycle, hidden for the next
    /// `off_frames`. With `start_hidden` the cycle begins with the off phase.
    pub fn visible(&self, frame: u32) -> bool {
        let cycle = u64::from(self.on_frames) + u64::from(self.off_frames);
        if cycle == 0 {
            return true;
        }
        let phase = u64::from(frame) % cycle;
        if self.start_hidden {
            phase >= u64::from(self.off_frames)
        } else {
            phase < u64::from(self.on_frames)
        }
    }
}
