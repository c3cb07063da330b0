use flashvox_lib::study::{SessionView, StudyStats};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Wrap `text` in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Simple word-wrapping for terminal output
fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.chars().count());

    for line in text.lines() {
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(format!("{}{}", prefix, current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            lines.push(format!("{}{}", prefix, current_line));
        }
    }

    lines
}

/// Render the current card of a session
pub fn render_card(view: &SessionView, use_color: bool) -> String {
    let mut lines = Vec::new();

    let mut header = format!("Card {}  ({} left)", view.progress_label, view.remaining);
    if let Some(elapsed) = &view.elapsed {
        header.push_str(&format!("  {}", elapsed));
    }
    lines.push(paint(&header, Color::DIM, use_color));

    if let Some(front) = &view.front_text {
        let side = if view.is_flipped { Color::DIM } else { Color::BOLD };
        for line in wrap_lines(front, "  ", 80) {
            lines.push(paint(&line, side, use_color));
        }
    }

    if let Some(back) = &view.back_text {
        lines.push(paint("  ---", Color::DIM, use_color));
        for line in wrap_lines(back, "  ", 80) {
            lines.push(paint(&line, Color::CYAN, use_color));
        }
    }

    if view.instructions_visible {
        lines.push(paint("[f]lip  [s]peak  [q]uit", Color::DIM, use_color));
    } else if view.grading_visible {
        lines.push(format!(
            "{}  {}  {}  [f]lip  [s]peak  [q]uit",
            paint("[1] easy", Color::GREEN, use_color),
            paint("[2] medium", Color::YELLOW, use_color),
            paint("[3] difficult", Color::RED, use_color),
        ));
    }

    lines.join("\n")
}

/// One-line summary of session stats
pub fn render_stats(stats: &StudyStats, use_color: bool) -> String {
    format!(
        "{} easy, {} medium, {} difficult of {} ({}% recalled)",
        paint(&stats.correct.to_string(), Color::GREEN, use_color),
        paint(&stats.medium.to_string(), Color::YELLOW, use_color),
        paint(&stats.difficult.to_string(), Color::RED, use_color),
        stats.total,
        stats.success_rate()
    )
}
