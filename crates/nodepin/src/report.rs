use nodepin_backend::InstallGuidance;
use nodepin_core::{LtsStatus, ReleaseRecord, SuggestionSet};

fn describe(record: &ReleaseRecord) -> String {
    match &record.lts {
        LtsStatus::Codename(name) => format!(
            "{} (LTS {name}, {})",
            record.version_label, record.release_date
        ),
        LtsStatus::Flagged => format!("{} (LTS, {})", record.version_label, record.release_date),
        LtsStatus::NotLts => format!("{} ({})", record.version_label, record.release_date),
    }
}

fn push_section(lines: &mut Vec<String>, heading: &str, records: &[ReleaseRecord]) {
    lines.push(heading.to_string());
    if records.is_empty() {
        lines.push("  (none)".to_string());
    }
    lines.extend(records.iter().map(|record| format!("  {}", describe(record))));
}

/// Operator-facing lines for a suggestion set.
pub fn render_suggestions(set: &SuggestionSet) -> Vec<String> {
    let mut lines = vec![
        format!("Releases near {}:", set.target),
        format!("Latest release: {}", describe(&set.latest)),
    ];
    if let Some(lts) = &set.latest_lts {
        lines.push(format!("Latest LTS release: {}", describe(lts)));
    }
    push_section(&mut lines, "Nearest LTS releases:", &set.nearest_lts);
    push_section(&mut lines, "Nearest non-LTS releases:", &set.nearest_non_lts);
    lines
}

pub fn render_install_guidance(display_name: &str, guidance: &InstallGuidance) -> Vec<String> {
    let mut lines = vec![
        format!("{display_name} was not found."),
        guidance.summary.clone(),
    ];
    if let Some(command) = &guidance.command {
        lines.push(format!("  {command}"));
    }
    lines.push(format!("More information: {}", guidance.url));
    lines
}
