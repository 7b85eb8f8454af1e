//! Output formats and the text renderers behind them.

mod text;

pub use text::{print_hits, print_report, print_stats};

/// Output format options supported by the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// One pretty-printed JSON document
    Json,
    /// Newline-delimited JSON, one object per line
    Jsonl,
}

impl OutputFormat {
    pub const fn is_machine(self) -> bool {
        matches!(self, Self::Json | Self::Jsonl)
    }
}

/// Print `items` as a JSON array or as JSON lines.
pub fn print_json_items<T: serde::Serialize>(items: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Jsonl => {
            for item in items {
                println!("{}", serde_json::to_string(item)?);
            }
        },
        _ => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}
