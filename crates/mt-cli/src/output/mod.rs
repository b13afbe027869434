//! Output formatting utilities for the CLI
//!
//! Tables for instances, shell `export` lines and colored status messages.

use tabled::{settings::Style, Table, Tabled};

use mt_core::Instance;

/// Format created instances as an ASCII table
pub fn format_instances(instances: &[Instance]) -> String {
    if instances.is_empty() {
        return "No instances".to_string();
    }

    #[derive(Tabled)]
    struct InstanceRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "TYPE")]
        kind: String,
        #[tabled(rename = "HOST")]
        host: String,
        #[tabled(rename = "PORT")]
        port: u16,
        #[tabled(rename = "USERNAME")]
        username: String,
        #[tabled(rename = "PASSWORD")]
        password: String,
    }

    let rows: Vec<InstanceRow> = instances
        .iter()
        .map(|i| InstanceRow {
            id: i.id.to_string(),
            kind: i.kind.clone(),
            host: i.host.clone(),
            port: i.port,
            username: or_dash(&i.username),
            password: or_dash(&i.password),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format the connection variables of an instance as `export` lines
pub fn format_env(instance: &Instance) -> String {
    instance
        .env_vars()
        .into_iter()
        .map(|(key, value)| format!("export {}={}\n", key, shell_quote(&value)))
        .collect()
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

/// Quote a value for POSIX shells
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
///
/// Status messages go to stderr so stdout stays clean for remote output
/// and `export` lines.
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
