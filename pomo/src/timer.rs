//! Pomodoro state machine
//!
//! Work intervals alternate with breaks. Every second completed work
//! interval is followed by a long break instead of a short one:
//!
//! ```text
//! Work -> ShortBreak -> Work -> LongBreak -> Work -> ShortBreak -> ...
//! ```
//!
//! Work time is written to the activity log whenever a work segment ends:
//! at the end of the interval, on pause, and on unpause (as a pause
//! segment). The state itself has no notion of wall-clock ticks; the
//! caller feeds it deltas through [`TimerState::update`].

use crate::config::Icons;
use crate::interval::{duration_secs, IntervalKind};
use crate::record::{ActivityRecord, ActivityRecorder, SegmentKind};
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Work intervals between long breaks
const WORK_INTERVALS_PER_LONG_BREAK: u8 = 2;

pub struct TimerState {
    interval: IntervalKind,
    elapsed: Duration,
    duration_secs: u64,
    last_tick: Instant,
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    description: String,
    work_intervals: u8,
    paused: bool,
    shutdown: bool,
    recorder: Box<dyn ActivityRecorder>,
}

impl TimerState {
    pub fn new(description: impl Into<String>, recorder: Box<dyn ActivityRecorder>) -> Self {
        let now = Local::now();
        let interval = IntervalKind::Work;
        Self {
            interval,
            elapsed: Duration::ZERO,
            duration_secs: duration_secs(interval),
            last_tick: Instant::now(),
            start_time: now,
            end_time: now,
            description: description.into(),
            work_intervals: 0,
            paused: false,
            shutdown: false,
            recorder,
        }
    }

    pub fn interval(&self) -> IntervalKind {
        self.interval
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    #[cfg(test)]
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        info!("Description set to '{}'", self.description);
    }

    #[cfg(test)]
    pub fn work_intervals(&self) -> u8 {
        self.work_intervals
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    pub fn minutes_elapsed(&self) -> u64 {
        self.elapsed_secs() / 60
    }

    pub fn remaining_minutes(&self) -> u64 {
        self.duration_secs.saturating_sub(self.elapsed_secs()) / 60
    }

    /// Restart the current segment from zero. Unrecorded time is dropped.
    pub fn zero(&mut self) {
        let now = Local::now();
        self.last_tick = Instant::now();
        self.elapsed = Duration::ZERO;
        self.start_time = now;
        self.end_time = now;
    }

    /// End the current interval and move to the next one.
    pub fn cycle(&mut self) {
        info!("Ending interval {}", self.interval);
        match self.interval {
            IntervalKind::Work => {
                self.record();
                info!("Taking a break from {}", self.description);
                self.work_intervals += 1;
                if self.work_intervals == WORK_INTERVALS_PER_LONG_BREAK {
                    self.interval = IntervalKind::LongBreak;
                    self.work_intervals = 0;
                } else {
                    self.interval = IntervalKind::ShortBreak;
                }
            }
            IntervalKind::ShortBreak | IntervalKind::LongBreak => {
                info!("Starting work on {}", self.description);
                self.interval = IntervalKind::Work;
                self.start_time = Local::now();
            }
        }

        self.zero();
        self.duration_secs = duration_secs(self.interval);
    }

    /// Time since the previous call (or the last `zero`), measured on the
    /// monotonic clock.
    pub fn take_delta(&mut self, now: Instant) -> Duration {
        let delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        delta
    }

    pub fn update(&mut self, delta: Duration) {
        if self.paused {
            return;
        }
        self.elapsed += delta;

        if self.elapsed_secs() >= self.duration_secs {
            self.cycle();
        }
    }

    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        if self.interval == IntervalKind::Work {
            self.record();
            self.start_time = Local::now();
        }
        self.paused = true;
        info!("Paused at {}s into {}", self.elapsed_secs(), self.interval);
    }

    pub fn unpause(&mut self) {
        if !self.paused {
            return;
        }
        if self.interval == IntervalKind::Work {
            self.record();
            self.start_time = Local::now();
        }
        self.paused = false;
        info!("Resumed {}", self.interval);
    }

    /// Close the current segment and hand it to the recorder.
    ///
    /// Panics if the wall clock moved backwards since the segment started.
    pub fn record(&mut self) {
        self.end_time = Local::now();
        assert!(
            self.end_time >= self.start_time,
            "clock went backwards: segment started at {} but ended at {}",
            self.start_time,
            self.end_time
        );

        let record = ActivityRecord {
            start: self.start_time,
            end: self.end_time,
            description: self.description.clone(),
            kind: if self.paused {
                SegmentKind::Pause
            } else {
                SegmentKind::Work
            },
        };
        if let Err(e) = self.recorder.append(&record) {
            error!("Failed to write activity record: {}", e);
        }
    }

    pub fn status_text(&self, icons: &Icons) -> String {
        let icon = if self.paused {
            &icons.paused
        } else {
            match self.interval {
                IntervalKind::Work => &icons.work,
                IntervalKind::ShortBreak => &icons.short_break,
                IntervalKind::LongBreak => &icons.long_break,
            }
        };
        format!(
            "{} {}m / {}m",
            icon,
            self.minutes_elapsed(),
            self.duration_secs / 60
        )
    }
}
