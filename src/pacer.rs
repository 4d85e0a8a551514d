use std::time::{Duration, Instant};

/// Fixed-rate frame scheduling for the event loop.
///
/// The loop waits until `deadline()` and draws once `is_due` holds. A frame
/// that finishes late resynchronises the schedule to the present moment
/// rather than queueing catch-up frames.
pub struct FramePacer {
    frame_time: Duration,
    next_frame: Instant,

    // Measured rate
    frame_counter: u32,
    last_report: Instant,
}

impl FramePacer {
    pub fn from_fps(fps: u32, now: Instant) -> Self {
        let fps = fps.max(1);
        Self {
            frame_time: Duration::from_nanos(1_000_000_000 / u64::from(fps)),
            next_frame: now,
            frame_counter: 0,
            last_report: now,
        }
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn deadline(&self) -> Instant {
        self.next_frame
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_frame
    }

    /// When the loop should next wake. A deadline already in the past is
    /// pushed one frame ahead so a frame that never presents cannot spin.
    pub fn wake_at(&self, now: Instant) -> Instant {
        if self.next_frame > now {
            self.next_frame
        } else {
            now + self.frame_time
        }
    }

    /// Advances the schedule for a frame that was not drawn.
    pub fn skip(&mut self, now: Instant) {
        self.next_frame = now + self.frame_time;
    }

    /// Schedules the next frame. Returns the measured frames per second once
    /// a full second has been observed.
    pub fn frame_presented(&mut self, now: Instant) -> Option<f32> {
        self.next_frame += self.frame_time;
        if self.next_frame < now {
            self.next_frame = now;
        }

        self.frame_counter += 1;
        let elapsed = now.duration_since(self.last_report).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frame_counter as f32 / elapsed;
            self.frame_counter = 0;
            self.last_report = now;
            Some(fps)
        } else {
            None
        }
    }
}
