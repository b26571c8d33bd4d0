use std::{fmt::Write, time::Duration};

/// Pretty-print the elapsed time (used in progress bars)
pub fn elapsed_subsec(state: &indicatif::ProgressState, writer: &mut dyn Write) {
    let seconds = state.elapsed().as_secs();
    let sub_seconds = (state.elapsed().as_millis() % 1000) / 100;
    let _ = writer.write_str(&format!("{}.{}s", seconds, sub_seconds));
}

/// Pretty-print a command's running time, picking the largest unit that keeps
/// the value above one.
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    let millis = duration.as_millis();
    let seconds = duration.as_secs();

    match seconds {
        0 => match millis {
            0 => format!("{}µs", micros),
            _ => format!("{:.3}ms", micros as f64 / 1_000.0),
        },
        1..=59 => format!("{:.3}s", duration.as_secs_f64()),
        _ => format!("{}m {}s", seconds / 60, seconds % 60),
    }
}
