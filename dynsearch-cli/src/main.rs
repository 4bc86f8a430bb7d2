//! dynsearch - compile search criteria JSON into parameterized SQL.

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use dynsearch_sql::{
    Dialect, FilterCompiler, FilterDecoder, MySql, Postgres, QueryAssembler, QueryCriteria,
    QueryResult, SortCompiler,
};
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::{DialectKind, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let settings = cli.apply(Settings::load(cli.config.as_deref())?);
    tracing::debug!(?settings, "effective settings");

    match &cli.command {
        Commands::Compile { base, input, .. } => {
            let text = read_input(input.as_deref())?;
            let decoder = FilterDecoder::new()
                .format(settings.wire_format)
                .max_depth(settings.max_depth);
            let criteria = QueryCriteria::from_json_str(&text, &decoder)
                .context("failed to decode criteria")?;

            let result = match settings.dialect {
                DialectKind::Postgres => assemble(Postgres::default(), &settings, base, &criteria),
                DialectKind::Mysql => assemble(MySql::default(), &settings, base, &criteria),
            }
            .context("failed to compile query")?;

            println!("{}", serde_json::to_string_pretty(&result)?);
        },
        Commands::Sort { sorts } => {
            let sql = match settings.dialect {
                DialectKind::Postgres => SortCompiler::with_dialect(Postgres::default()).compile(sorts),
                DialectKind::Mysql => SortCompiler::with_dialect(MySql::default()).compile(sorts),
            }
            .context("failed to compile sort")?;
            println!("{sql}");
        },
        Commands::Check { identifier } => {
            let quoted = match settings.dialect {
                DialectKind::Postgres => Postgres::default().quote_identifier(identifier),
                DialectKind::Mysql => MySql::default().quote_identifier(identifier),
            }?;
            println!("{quoted}");
        },
    }

    Ok(())
}

fn assemble<D: Dialect>(
    dialect: D,
    settings: &Settings,
    base: &str,
    criteria: &QueryCriteria,
) -> dynsearch_sql::Result<QueryResult> {
    let compiler = FilterCompiler::with_dialect(dialect)
        .max_depth(settings.max_depth)
        .escape_like(settings.escape_like);
    QueryAssembler::from_compiler(compiler).assemble(base, criteria, settings.paging)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read criteria file: {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read criteria from stdin")?;
            Ok(text)
        },
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
