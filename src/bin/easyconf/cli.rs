// CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "easyconf")]
#[command(version = "0.1.0")]
#[command(about = "Inspect layered component configuration", long_about = None)]
pub struct Cli {
    /// Path to an easyconf config file (json/yaml/toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory to search for configuration files, may be repeated
    #[arg(short = 'p', long = "search-path", global = true)]
    pub search_paths: Vec<String>,

    /// Log filter, e.g. "debug" or "easyconf=debug"
    #[arg(long, global = true, default_value = "warn")]
    pub log: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a single property
    Get(GetArgs),
    /// List the sources a component was loaded from
    Sources(ComponentArgs),
    /// Print every resolved property of a component
    Dump(ComponentArgs),
}

#[derive(Args, Debug)]
pub struct ComponentArgs {
    /// Component name
    pub component: String,

    /// Company id
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: ComponentArgs,

    /// Property key
    pub key: String,

    /// Selector appended as key[selector], most general first
    #[arg(short, long = "selector")]
    pub selectors: Vec<String>,

    /// Substitution variable as name=value
    #[arg(long = "var", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,

    /// Print list values one per line
    #[arg(long)]
    pub list: bool,
}

fn parse_variable(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid variable '{}', expected name=value", s))
}
