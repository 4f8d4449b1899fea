//! Visual theme and styling.

use console::Style;

/// procgather's visual theme.
#[derive(Debug, Clone)]
pub struct ProcGatherTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for the end-of-process marker.
    pub end_marker: Style,
    /// Style for contextual hints (cyan dim).
    pub hint: Style,
}

impl Default for ProcGatherTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcGatherTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            end_marker: Style::new().green().bold(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            end_marker: Style::new(),
            hint: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("▣"), self.highlight.apply_to(title))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_success() {
        let theme = ProcGatherTheme::plain();
        let msg = theme.format_success("Saved");
        assert_eq!(msg, "✓ Saved");
    }

    #[test]
    fn theme_formats_warning() {
        let theme = ProcGatherTheme::plain();
        let msg = theme.format_warning("Unsaved changes");
        assert!(msg.contains("⚠"));
        assert!(msg.contains("Unsaved changes"));
    }

    #[test]
    fn theme_formats_error() {
        let theme = ProcGatherTheme::plain();
        let msg = theme.format_error("Failed");
        assert!(msg.contains("✗"));
        assert!(msg.contains("Failed"));
    }

    #[test]
    fn theme_formats_header() {
        let theme = ProcGatherTheme::plain();
        let msg = theme.format_header("Payroll");
        assert!(msg.contains("Payroll"));
        assert!(msg.contains("▣"));
    }

    #[test]
    fn default_impl_matches_new() {
        let default = ProcGatherTheme::default();
        let new = ProcGatherTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
