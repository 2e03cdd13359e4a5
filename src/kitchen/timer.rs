//! One-second countdown for timed recipe steps.

/// Spoken at fixed thresholds while the countdown runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAnnouncement {
    OneMinute,
    ThirtySeconds,
    TenSeconds,
    TimeUp,
}

impl TimerAnnouncement {
    pub fn text(&self) -> &'static str {
        match self {
            TimerAnnouncement::OneMinute => "One minute remaining.",
            TimerAnnouncement::ThirtySeconds => "Thirty seconds remaining.",
            TimerAnnouncement::TenSeconds => "Ten seconds remaining.",
            TimerAnnouncement::TimeUp => "Time is up!",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    remaining: u32,
    initial: u32,
    paused: bool,
    max_secs: u32,
}

impl CountdownTimer {
    /// `max_secs` caps [`add_minute`](Self::add_minute).
    pub fn new(max_secs: u32) -> Self {
        Self {
            remaining: 0,
            initial: 0,
            paused: false,
            max_secs,
        }
    }

    /// Arm a new countdown; a running one is replaced and the pause flag
    /// cleared.
    pub fn start(&mut self, secs: u32) {
        self.remaining = secs;
        self.initial = secs;
        self.paused = false;
    }

    /// Advance one second. Returns the announcement due at the new value;
    /// reaching zero clears the timer.
    pub fn tick(&mut self) -> Option<TimerAnnouncement> {
        if !self.is_counting() {
            return None;
        }
        self.remaining -= 1;
        match self.remaining {
            60 => Some(TimerAnnouncement::OneMinute),
            30 => Some(TimerAnnouncement::ThirtySeconds),
            10 => Some(TimerAnnouncement::TenSeconds),
            0 => {
                self.initial = 0;
                Some(TimerAnnouncement::TimeUp)
            }
            _ => None,
        }
    }

    /// The pause flag is independent of whether a countdown exists.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip the pause flag, returning the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Add sixty seconds, capped at the maximum.
    pub fn add_minute(&mut self) {
        if self.is_running() {
            self.remaining = self.remaining.saturating_add(60).min(self.max_secs);
        }
    }

    /// Stop and clear. Returns `true` if a countdown was running.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.is_running();
        self.remaining = 0;
        self.initial = 0;
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.remaining > 0
    }

    /// Running and not paused.
    pub fn is_counting(&self) -> bool {
        self.is_running() && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    /// Remaining time as a percentage of the armed duration, at most 100.
    pub fn progress_percent(&self) -> f32 {
        if self.initial == 0 {
            return 0.0;
        }
        (self.remaining as f32 / self.initial as f32 * 100.0).min(100.0)
    }
}

/// `MM:SS`.
///
/// ```
/// use voice_chef::kitchen::format_clock;
///
/// assert_eq!(format_clock(605), "10:05");
/// ```
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(timer: &mut CountdownTimer) -> Vec<(u32, TimerAnnouncement)> {
        let mut said = Vec::new();
        while timer.is_counting() {
            if let Some(a) = timer.tick() {
                said.push((timer.remaining(), a));
            }
        }
        said
    }

    #[test]
    fn announcements_at_thresholds() {
        let mut timer = CountdownTimer::new(3600);
        timer.start(90);
        assert_eq!(
            run_to_end(&mut timer),
            vec![
                (60, TimerAnnouncement::OneMinute),
                (30, TimerAnnouncement::ThirtySeconds),
                (10, TimerAnnouncement::TenSeconds),
                (0, TimerAnnouncement::TimeUp),
            ]
        );
        assert!(!timer.is_running());
        assert_eq!(timer.initial(), 0);
    }

    #[test]
    fn paused_timer_does_not_tick() {
        let mut timer = CountdownTimer::new(3600);
        timer.start(5);
        timer.pause();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining(), 5);
        assert!(!timer.toggle_pause());
        timer.tick();
        assert_eq!(timer.remaining(), 4);
    }

    #[test]
    fn add_minute_is_capped() {
        let mut timer = CountdownTimer::new(3600);
        timer.start(3570);
        timer.add_minute();
        assert_eq!(timer.remaining(), 3600);
        assert_eq!(timer.progress_percent(), 100.0);
    }

    #[test]
    fn add_minute_without_timer_does_nothing() {
        let mut timer = CountdownTimer::new(3600);
        timer.add_minute();
        assert!(!timer.is_running());
    }

    #[test]
    fn cancel_clears() {
        let mut timer = CountdownTimer::new(3600);
        timer.start(120);
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert_eq!(timer.progress_percent(), 0.0);
    }

    #[test]
    fn starting_a_new_timer_clears_pause() {
        let mut timer = CountdownTimer::new(3600);
        timer.pause();
        timer.start(30);
        assert!(timer.is_counting());
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(3600), "60:00");
    }
}
