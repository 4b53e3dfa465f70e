pub mod events;
pub mod store;

pub use events::SessionEvent;
pub use store::{CompletedSessionSink, SessionTimerStore, SNAPSHOT_KEY};

/// Render accumulated seconds for the UI: `HH:MM:SS` once an hour has
/// accumulated, `MM:SS` before that, all components zero-padded.
pub fn format_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_time;

    #[test]
    fn format_time_renders_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn format_time_adds_hours_once_reached() {
        assert_eq!(format_time(3600), "01:00:00");
        assert_eq!(format_time(3661), "01:01:01");
        assert_eq!(format_time(7325), "02:02:05");
        assert_eq!(format_time(36_000), "10:00:00");
    }
}
