// Wed Jan 15 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "module-finder")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Heuristic lookup over dumped webpack module tables", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarise a module table dump.
    Stats(StatsArgs),
    /// Search for modules with the built-in filters.
    Find(FindArgs),
    /// Map stable names onto mangled export keys.
    Mangled(MangledArgs),
    /// List stores or show one by name.
    Stores(StoresArgs),
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[arg(short, long)]
    pub table: PathBuf,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    #[arg(short, long)]
    pub table: PathBuf,

    #[arg(long, value_delimiter = ',')]
    pub keys: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub prototype_keys: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub strings: Vec<String>,

    #[arg(long)]
    pub source: Vec<String>,

    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub store_name: Option<String>,

    #[arg(long)]
    pub all: bool,

    #[arg(long)]
    pub default_key_only: bool,

    #[arg(long)]
    pub no_default_export: bool,

    #[arg(long, default_value = "1")]
    pub depth: usize,
}

#[derive(Parser, Debug)]
pub struct MangledArgs {
    #[arg(short, long)]
    pub table: PathBuf,

    /// Text that must appear in the module factory source.
    #[arg(long)]
    pub locator: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub locator_keys: Vec<String>,

    /// `name=needle+needle`: bind `name` to the first export whose source
    /// contains every needle.
    #[arg(long = "map", required = true)]
    pub mappings: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct StoresArgs {
    #[arg(short, long)]
    pub table: PathBuf,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "1")]
    pub depth: usize,
}

impl FindArgs {
    pub fn validate(&self) -> Result<(), String> {
        let has_filter = !self.keys.is_empty()
            || !self.prototype_keys.is_empty()
            || !self.strings.is_empty()
            || !self.source.is_empty()
            || self.display_name.is_some()
            || self.store_name.is_some();
        if !has_filter {
            return Err("At least one filter option must be given".to_string());
        }
        Ok(())
    }
}

impl MangledArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.locator.is_none() == self.locator_keys.is_empty() {
            return Err("Exactly one of --locator or --locator-keys must be specified".to_string());
        }
        for mapping in &self.mappings {
            parse_mapping(mapping)?;
        }
        Ok(())
    }
}

/// Splits `name=a+b` into the name and its needles.
pub fn parse_mapping(raw: &str) -> Result<(String, Vec<String>), String> {
    let (name, needles) = raw
        .split_once('=')
        .ok_or_else(|| format!("Mapping must look like name=needle: {}", raw))?;
    let needles: Vec<String> = needles
        .split('+')
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    if name.is_empty() || needles.is_empty() {
        return Err(format!("Mapping needs a name and at least one needle: {}", raw));
    }
    Ok((name.to_string(), needles))
}
