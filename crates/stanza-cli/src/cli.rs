use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stanza")]
#[command(version)]
#[command(about = "Render placeholder templates with repeatable block rows", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template file
    Render(RenderArgs),
    /// List the placeholders of a template with their occurrence counts
    Vars(TemplateArg),
    /// List the block rows of a template in extraction order
    Blocks(TemplateArg),
}

#[derive(Args)]
pub struct TemplateArg {
    /// Template file
    pub template: PathBuf,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Template file
    pub template: PathBuf,

    /// Variables file (JSON or YAML mapping); may be repeated, later files win
    #[arg(long = "vars", value_name = "FILE")]
    pub vars: Vec<PathBuf>,

    /// Expand a block row with records from a file (JSON or YAML sequence)
    #[arg(long = "rows", value_name = "HANDLE=FILE", value_parser = parse_rows_arg)]
    pub rows: Vec<(String, PathBuf)>,

    /// Remove placeholders left unresolved after rendering
    #[arg(long)]
    pub strip: bool,

    /// Maximum number of substitution passes
    #[arg(long, value_name = "N")]
    pub depth: Option<stanza::RecursionDepth>,

    /// Keep BEGIN/END markers inside extracted block rows
    #[arg(long)]
    pub keep_markers: bool,

    /// Configuration file (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_rows_arg(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((handle, path)) if !handle.is_empty() && !path.is_empty() => {
            Ok((handle.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected HANDLE=FILE, got '{arg}'")),
    }
}
