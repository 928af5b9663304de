use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact one-line-per-item output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// One row of a listing. Lists of rows display as a single table.
pub trait TableRow {
    const HEADERS: &'static [&'static str];
    const EMPTY: &'static str = "Nothing to show";

    fn row(&self) -> Vec<Cell>;
    fn compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(&self.options);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    /// Whether human-oriented messages should be printed alongside data
    pub fn is_human(&self) -> bool {
        !self.options.quiet && self.options.output_format != OutputFormat::Json
    }

    fn tagged(&self, icon: &str, color: Color, message: &str) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }

    pub fn success(&self, message: &str) {
        if self.is_human() {
            println!("{}", self.tagged(ICONS.success, THEME.success, message));
        }
    }

    /// Errors always print, to stderr, even when quiet.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.tagged(ICONS.error, THEME.error, message));
    }

    pub fn warning(&self, message: &str) {
        if self.is_human() {
            println!("{}", self.tagged(ICONS.warning, THEME.warning, message));
        }
    }

    /// Only with `--verbose`, on stderr.
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.tagged(ICONS.arrow, THEME.muted, message));
        }
    }

    pub fn info(&self, message: &str) {
        if self.is_human() {
            println!("{}", self.tagged(ICONS.info, THEME.info, message));
        }
    }

    /// Display a heading
    pub fn heading(&self, text: &str) {
        if self.is_human() {
            let output = if self.options.no_color {
                format!("{text}\n{}", "=".repeat(text.chars().count()))
            } else {
                format!("{}", text.color(THEME.primary).bold())
            };
            println!("{output}");
        }
    }
}

/// Create a themed table
pub fn create_table(options: &GlobalOptions) -> Table {
    let mut table = Table::new();

    if !options.no_color {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    } else {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    }

    table
}

/// Add themed header to table
pub fn add_table_header(table: &mut Table, headers: &[&str], options: &GlobalOptions) {
    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| {
            let cell = Cell::new(h).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(header_cells);
}

/// Two-column key/value table for a single record
pub fn key_value_table(rows: Vec<(&str, String)>, options: &GlobalOptions) -> Table {
    let mut table = create_table(options);
    for (key, value) in rows {
        let key_cell = Cell::new(key).add_attribute(Attribute::Bold);
        let key_cell = if options.no_color { key_cell } else { key_cell.fg(TableColor::Cyan) };
        table.add_row(vec![key_cell, Cell::new(value)]);
    }
    table
}

impl<T> TableDisplay for Vec<T>
where
    T: TableRow + Serialize,
{
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);

        if self.is_empty() {
            table.add_row(vec![Cell::new(T::EMPTY)]);
            return table;
        }

        add_table_header(&mut table, T::HEADERS, options);
        for item in self {
            table.add_row(item.row());
        }

        table
    }

    fn to_compact(&self) -> String {
        self.iter().map(TableRow::compact).collect::<Vec<_>>().join("\n")
    }
}
