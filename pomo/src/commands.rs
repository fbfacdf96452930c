//! Maps control commands onto the timer and phrases the reply

use crate::timer::TimerState;
use pomo_ipc::Command;
use std::time::Duration;

/// Apply `command` to the timer. Never fails; unknown input is echoed.
pub fn execute(state: &mut TimerState, command: Command) -> String {
    match command {
        Command::Continue => {
            state.unpause();
            format!(
                "🏃 Time remaining: {} minutes",
                state.remaining_minutes()
            )
        }
        Command::Kill => {
            state.request_shutdown();
            "💤 Shutting server down.".to_string()
        }
        Command::Pause => {
            state.pause();
            format!("⏱ Paused at {}", format_elapsed(state.elapsed()))
        }
        Command::Reset => {
            state.zero();
            "🔄 Resetting timer.".to_string()
        }
        Command::Time => format!(
            "⏲ Current interval has run for {} minutes",
            state.minutes_elapsed()
        ),
        Command::Skip => {
            let skipped = state.interval();
            state.cycle();
            format!("⏯ Skipping {}.", skipped)
        }
        Command::Set {
            description: Some(description),
        } => {
            state.set_description(description);
            format!("📑 Set description to '{}'.", state.description())
        }
        Command::Set { description: None } => {
            if state.description().is_empty() {
                "🙉 Current description is empty.".to_string()
            } else {
                format!("📖 Current description is '{}'.", state.description())
            }
        }
        Command::Other(text) => text,
    }
}

/// `H:MM:SS`
fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalKind;
    use crate::record::testing::MemoryRecorder;

    fn state() -> TimerState {
        TimerState::new("", Box::new(MemoryRecorder::default()))
    }

    fn run(state: &mut TimerState, text: &str) -> String {
        execute(state, Command::parse(text))
    }

    #[test]
    fn set_then_query_round_trips() {
        let mut state = state();
        assert_eq!(
            run(&mut state, "set --description 'abc'"),
            "📑 Set description to 'abc'."
        );
        assert!(run(&mut state, "set").contains("abc"));
    }

    #[test]
    fn query_without_description_says_empty() {
        let mut state = state();
        assert_eq!(run(&mut state, "set"), "🙉 Current description is empty.");

        run(&mut state, "set --description 'x'");
        run(&mut state, "set --description ''");
        assert_eq!(run(&mut state, "set"), "🙉 Current description is empty.");
    }

    #[test]
    fn unknown_text_is_echoed_exactly() {
        let mut state = state();
        assert_eq!(run(&mut state, "xyzzy"), "xyzzy");
        assert_eq!(run(&mut state, "xyzzy\n"), "xyzzy");
        assert_eq!(run(&mut state, ""), "");
    }

    #[test]
    fn kill_requests_shutdown() {
        let mut state = state();
        assert_eq!(run(&mut state, "kill"), "💤 Shutting server down.");
        assert!(state.shutdown_requested());
    }

    #[test]
    fn pause_and_continue() {
        let mut state = state();
        state.update(Duration::from_secs(3725));
        // 3725s is past the work interval, so we're on a short break now
        assert_eq!(state.interval(), IntervalKind::ShortBreak);
        state.update(Duration::from_secs(125));

        assert_eq!(run(&mut state, "pause"), "⏱ Paused at 0:02:05");
        assert!(state.is_paused());

        assert_eq!(run(&mut state, "continue"), "🏃 Time remaining: 7 minutes");
        assert!(!state.is_paused());
    }

    #[test]
    fn time_and_reset() {
        let mut state = state();
        state.update(Duration::from_secs(185));
        assert_eq!(
            run(&mut state, "time"),
            "⏲ Current interval has run for 3 minutes"
        );

        assert_eq!(run(&mut state, "reset"), "🔄 Resetting timer.");
        assert_eq!(state.elapsed_secs(), 0);
        assert_eq!(
            run(&mut state, "time"),
            "⏲ Current interval has run for 0 minutes"
        );
    }

    #[test]
    fn skip_names_the_interval_left_behind() {
        let mut state = state();
        assert_eq!(run(&mut state, "skip"), "⏯ Skipping work.");
        assert_eq!(state.interval(), IntervalKind::ShortBreak);
        assert_eq!(run(&mut state, "skip"), "⏯ Skipping short break.");
        assert_eq!(state.interval(), IntervalKind::Work);
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::ZERO), "0:00:00");
        assert_eq!(format_elapsed(Duration::from_millis(61_900)), "0:01:01");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 7)), "3:00:07");
    }
}
