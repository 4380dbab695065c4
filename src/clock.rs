use std::thread;
use std::time::Duration;
use std::time::Instant;

/// Caps how often the main loop runs
pub trait Limiter {
    /// Block until the current frame's time is used up. Returns the time since the previous tick.
    fn tick(&mut self) -> Duration;
}

/// Sleeps away whatever is left of a fixed frame time
pub struct Clock {
    frametime: Duration,
    last: Instant,
}

impl Clock {
    /// A clock capping the loop at `framerate` iterations per second. `0` leaves it uncapped.
    pub fn new(framerate: u32) -> Self {
        let frametime = match framerate {
            0 => Duration::ZERO,
            fps => Duration::from_secs(1) / fps,
        };

        Self {
            frametime,
            last: Instant::now(),
        }
    }

    pub fn frametime(&self) -> Duration {
        self.frametime
    }
}

impl Limiter for Clock {
    fn tick(&mut self) -> Duration {
        let time_left = self.frametime.saturating_sub(self.last.elapsed());
        thread::sleep(time_left);

        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;

        dt
    }
}
