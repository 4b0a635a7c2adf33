use std::io::Write;

use owo_colors::OwoColorize;

/// Terminal formatting for the console
#[derive(Debug, Clone, Copy, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// Print something the bot said
    pub fn bot_message(&self, name: &str, content: &str) {
        println!();
        println!("{} {}", name.bright_cyan().bold(), "säger:".dimmed());
        for line in content.lines() {
            println!("  {}", line);
        }
        println!();
    }

    /// Print a system/status message (indented)
    pub fn status(&self, message: &str) {
        println!("  {}", message.dimmed());
    }

    /// Print an info message (indented)
    pub fn info(&self, label: &str, value: &str) {
        println!("  {} {}", label.bright_blue(), value);
    }

    pub fn warning(&self, message: &str) {
        println!("  {} {}", "⚠".yellow(), message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
    }

    pub fn prompt(&self) {
        print!("{} ", ">".bright_green());
        let _ = std::io::stdout().flush();
    }
}
