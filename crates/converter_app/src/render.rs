use std::fmt::Write;

use converter_core::{AppViewModel, OutputFormat, SubmissionState};

pub fn render(view: &AppViewModel) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "YouTube Converter");
    let _ = writeln!(text, "Number of links: {}", view.link_count);
    for (index, link) in view.links.iter().enumerate() {
        let shown = if link.is_empty() { "(empty)" } else { link };
        let _ = writeln!(text, "  YouTube Link {}: {}", index + 1, shown);
    }

    let formats = OutputFormat::ALL
        .iter()
        .map(|format| {
            let label = format.as_str().to_ascii_uppercase();
            if *format == view.format {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(text, "Output format: {formats}");

    let status = match view.submission {
        SubmissionState::Idle => "Ready",
        SubmissionState::Pending => "Converting...",
        SubmissionState::Succeeded => "Done",
        SubmissionState::Failed => "Failed",
    };
    let submit = if view.submit_enabled {
        "available"
    } else {
        "disabled"
    };
    match view.bytes_received {
        Some(bytes) if view.submission == SubmissionState::Pending => {
            let _ = writeln!(
                text,
                "Status: {status} ({} received) | Submit: {submit}",
                format_bytes(bytes)
            );
        }
        _ => {
            let _ = writeln!(text, "Status: {status} | Submit: {submit}");
        }
    }

    if let Some(notification) = &view.notification {
        match &view.archive_path {
            Some(path) => {
                let _ = writeln!(text, "{notification} Saved to {}", path.display());
            }
            None => {
                let _ = writeln!(text, "{notification}");
            }
        }
    }
    if let Some(failure) = &view.last_failure {
        let _ = writeln!(text, "Last attempt failed: {failure}");
    }

    text
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
