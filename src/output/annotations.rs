//! GitHub Actions workflow commands
//!
//! Groups and annotations only make sense inside a workflow run, so the
//! `Annotator` prints nothing unless it is enabled.

/// Formats a workflow command such as `::error file=quotes.csv::message`
pub fn format_command(command: &str, properties: &[(&str, &str)], message: &str) -> String {
    let props = properties
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",");
    if props.is_empty() {
        format!("::{}::{}", command, message)
    } else {
        format!("::{} {}::{}", command, props, message)
    }
}

/// Emits workflow commands to stdout when running under GitHub Actions
#[derive(Debug, Clone, Copy)]
pub struct Annotator {
    enabled: bool,
}

impl Annotator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enabled when `GITHUB_ACTIONS=true`
    pub fn from_env() -> Self {
        Self::new(std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn emit(&self, line: String) {
        if self.enabled {
            println!("{}", line);
        }
    }

    pub fn group(&self, title: &str) {
        self.emit(format_command("group", &[], title));
    }

    pub fn end_group(&self) {
        self.emit(format_command("endgroup", &[], ""));
    }

    pub fn notice(&self, message: &str) {
        self.emit(format_command("notice", &[], message));
    }

    pub fn warning(&self, message: &str) {
        self.emit(format_command("warning", &[], message));
    }

    /// Error annotation, optionally pinned to a file
    pub fn error(&self, message: &str, file: Option<&str>) {
        let props: Vec<(&str, &str)> = file.map(|f| ("file", f)).into_iter().collect();
        self.emit(format_command("error", &props, message));
    }
}
