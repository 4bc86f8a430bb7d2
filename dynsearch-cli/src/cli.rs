use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DialectKind, Settings, WireArg};

pub const ENV_CONFIG: &str = "DYNSEARCH_CONFIG";

#[derive(Parser, Debug)]
#[command(name = "dynsearch")]
#[command(version, about = "Compile search criteria JSON into parameterized SQL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Target SQL dialect
    #[arg(long, global = true, value_enum)]
    pub dialect: Option<DialectKind>,

    /// Wire format of the filter tree
    #[arg(long, global = true, value_enum)]
    pub wire_format: Option<WireArg>,

    /// Maximum nested group levels
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Escape LIKE metacharacters in pattern values
    #[arg(long, global = true)]
    pub escape_like: Option<bool>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a full query from a criteria document
    Compile {
        /// Base query the clauses are appended to
        #[arg(long, short = 'b')]
        base: String,

        /// Criteria JSON file ("-" or absent reads stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Omit the LIMIT/OFFSET clause
        #[arg(long)]
        no_paging: bool,
    },
    /// Compile a `column=direction,...` sort string
    Sort {
        /// The sort string
        sorts: String,
    },
    /// Validate and quote an identifier
    Check {
        /// Column name or dotted path
        identifier: String,
    },
}

impl Cli {
    /// Apply command-line overrides on top of file settings.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(dialect) = self.dialect {
            settings.dialect = dialect;
        }
        if let Some(format) = self.wire_format {
            settings.wire_format = format.into();
        }
        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        if let Some(escape_like) = self.escape_like {
            settings.escape_like = escape_like;
        }
        if let Commands::Compile { no_paging: true, .. } = self.command {
            settings.paging = false;
        }
        settings
    }
}
