//! Command line arguments and the commands read from the terminal front end.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::str::FromStr;

use crate::models::{ProductUrl, SortColumn};

/// Track product pages and whether they are in stock.
#[derive(Parser, Debug)]
#[command(name = "stock-tracker", version, about)]
pub struct Cli {
    /// Config file path without extension (`tracker` reads `tracker.toml`)
    #[arg(long, default_value = "tracker")]
    pub config: String,
}

/// One line typed at the prompt; the first word names the command.
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct Repl {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveTarget {
    /// 1-based row number of the displayed table.
    Row(usize),
    Url(ProductUrl),
}

impl FromStr for RemoveTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(row) => RemoveTarget::Row(row),
            Err(_) => RemoveTarget::Url(ProductUrl(s.to_string())),
        })
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Track a product page
    Add { url: String },
    /// Set the draft url
    Url { text: Option<String> },
    /// Track the draft url
    Submit,
    /// Stop tracking a row (by table number) or url
    #[command(alias = "remove")]
    Rm { target: RemoveTarget },
    /// Sort by a column; repeat to flip the direction
    Sort {
        #[arg(value_enum, ignore_case = true)]
        column: SortColumn,
    },
    /// Toggle showing only in-stock products
    Instock,
    /// Reload from the store
    Refresh,
    /// Print the table
    #[command(alias = "ls")]
    List,
    /// Exit
    #[command(aliases = ["exit", "q"])]
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`; `help` and usage
    /// mistakes come back as the clap error to print.
    pub fn parse_line(line: &str) -> Result<Option<Self>, clap::Error> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }

        Repl::try_parse_from(words).map(|repl| Some(repl.command))
    }
}
