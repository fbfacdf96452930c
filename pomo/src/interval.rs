use std::fmt;

pub const WORK_SECS: u64 = 45 * 60;
pub const SHORT_BREAK_SECS: u64 = 10 * 60;
pub const LONG_BREAK_SECS: u64 = 20 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    Work,
    ShortBreak,
    LongBreak,
}

/// Target length of an interval, in seconds.
pub fn duration_secs(kind: IntervalKind) -> u64 {
    match kind {
        IntervalKind::Work => WORK_SECS,
        IntervalKind::ShortBreak => SHORT_BREAK_SECS,
        IntervalKind::LongBreak => LONG_BREAK_SECS,
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntervalKind::Work => "work",
            IntervalKind::ShortBreak => "short break",
            IntervalKind::LongBreak => "long break",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_lengths() {
        assert_eq!(duration_secs(IntervalKind::Work), 2700);
        assert_eq!(duration_secs(IntervalKind::ShortBreak), 600);
        assert_eq!(duration_secs(IntervalKind::LongBreak), 1200);
    }
}
