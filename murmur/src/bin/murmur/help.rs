//! Styled `--help` output: themed clap styles, per-command examples and an environment appendix.

use std::fmt::Write;

use clap::{
    ColorChoice, Command,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
};
use colored::{Color, Colorize, control::ShouldColorize};

use crate::{
    examples::{ExampleGroup, command_examples},
    theme::{ICONS, THEME},
};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL (referenced by the default config)"),
    ("MURMUR_CONFIG", "Path to the config file (default: murmur.toml)"),
    ("MURMUR_AS", "Username to act as, same as --as"),
    ("RUST_LOG", "Log filter, e.g. murmur=debug"),
];

/// Renders help text, honouring whether the terminal takes color.
#[derive(Clone, Copy)]
pub struct Help {
    color: bool,
}

impl Help {
    pub fn detect() -> Self {
        Self {
            color: ShouldColorize::from_env().should_colorize(),
        }
    }

    /// Decorate `command` with styles, the appendix and every subcommand's examples.
    pub fn decorate(self, command: Command) -> Command {
        let mut command = command
            .styles(self.styles())
            .color(if self.color { ColorChoice::Auto } else { ColorChoice::Never })
            .after_long_help(self.appendix());
        for example in command_examples() {
            if let Some(sub) = command.find_subcommand_mut(example.name) {
                *sub = sub.clone().after_long_help(self.examples(example.groups));
            }
        }
        command
    }

    fn paint(self, text: &str, color: Color, bold: bool) -> String {
        match (self.color, bold) {
            (false, _) => text.to_string(),
            (true, false) => text.color(color).to_string(),
            (true, true) => text.color(color).bold().to_string(),
        }
    }

    fn examples(self, groups: &[ExampleGroup]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint("Examples:", THEME.highlight, true));
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "  {}", self.paint(group.title, THEME.primary, true));
            for line in group.commands {
                let _ = writeln!(
                    out,
                    "    {} {}",
                    self.paint(ICONS.arrow, THEME.secondary, false),
                    self.paint(line, THEME.secondary, false)
                );
            }
        }
        out
    }

    fn appendix(self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint("Environment Variables:", THEME.highlight, true));
        for (name, description) in ENVIRONMENT_VARIABLES {
            let _ = writeln!(
                out,
                "  {}  {}",
                self.paint(name, THEME.key, true),
                self.paint(description, THEME.value, false)
            );
        }
        let _ = writeln!(
            out,
            "\n{} {}",
            self.paint("Tip:", THEME.highlight, true),
            self.paint(
                "Use 'murmur <command> --help' to view examples for each command.",
                THEME.secondary,
                false
            )
        );
        out
    }

    fn styles(self) -> Styles {
        let style = |color: Color| Style::new().fg_color(Some(clap_color(color)));
        Styles::styled()
            .usage(style(THEME.primary).bold())
            .header(style(THEME.highlight).bold())
            .literal(style(THEME.secondary))
            .placeholder(style(THEME.muted))
            .valid(style(THEME.success))
            .invalid(style(THEME.warning))
            .error(style(THEME.error).bold())
    }
}

fn clap_color(color: Color) -> ClapColor {
    let ansi = match color {
        Color::TrueColor { r, g, b } => return ClapColor::Rgb(RgbColor(r, g, b)),
        Color::Black => AnsiColor::Black,
        Color::Red => AnsiColor::Red,
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Blue => AnsiColor::Blue,
        Color::Magenta => AnsiColor::Magenta,
        Color::Cyan => AnsiColor::Cyan,
        Color::White => AnsiColor::White,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightGreen => AnsiColor::BrightGreen,
        Color::BrightYellow => AnsiColor::BrightYellow,
        Color::BrightBlue => AnsiColor::BrightBlue,
        Color::BrightMagenta => AnsiColor::BrightMagenta,
        Color::BrightCyan => AnsiColor::BrightCyan,
        Color::BrightWhite => AnsiColor::BrightWhite,
    };
    ClapColor::Ansi(ansi)
}
