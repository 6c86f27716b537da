use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use stanza::{template_var_definitions, Template};

use crate::cli::RenderArgs;
use crate::config::RenderConfig;
use crate::data;

/// Loads, fills and renders a template as described by `args`.
pub fn render(args: &RenderArgs) -> Result<String> {
    let settings = RenderConfig::resolve(args)?;

    let mut template = load(&args.template)?.with_recursion_depth(settings.recursion_depth);
    template
        .extract_block_rows(settings.remove_markers)
        .with_context(|| format!("invalid block rows in {}", args.template.display()))?;

    for path in &args.vars {
        let vars = data::load_variables(path)?;
        template
            .add_variable_map(&vars, true)
            .with_context(|| format!("invalid variables in {}", path.display()))?;
        log::info!("added {} variable(s) from {}", vars.len(), path.display());
    }

    for (handle, path) in &args.rows {
        let records = data::load_value(path)?;
        template
            .parse_block_row_value(handle, &records, None)
            .with_context(|| format!("cannot expand block row '{handle}' from {}", path.display()))?;
        log::info!("expanded block row '{handle}' from {}", path.display());
    }

    let unused: Vec<&str> = template.block_rows().handles().collect();
    if !unused.is_empty() {
        log::warn!("block rows left unexpanded: {}", unused.join(", "));
    }

    Ok(template.render(settings.strip_unresolved))
}

/// One `name<TAB>count` line per placeholder, first-seen order.
pub fn vars(path: &Path) -> Result<String> {
    let template = load(path)?;
    let defs = template_var_definitions(template.content().unwrap_or_default());

    let mut out = String::new();
    for (name, count) in defs.iter() {
        writeln!(out, "{name}\t{count}")?;
    }
    Ok(out)
}

/// One block name per line, in extraction order.
pub fn blocks(path: &Path) -> Result<String> {
    let template = load(path)?;
    let names = template
        .block_row_names()
        .with_context(|| format!("invalid block rows in {}", path.display()))?;

    let mut out = String::new();
    for name in names {
        writeln!(out, "{name}")?;
    }
    Ok(out)
}

fn load(path: &Path) -> Result<Template> {
    Template::from_file(path).with_context(|| format!("cannot load template {}", path.display()))
}

/// Writes `output` to `path`, or stdout when no path is given.
pub fn emit(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            print!("{output}");
            Ok(())
        }
    }
}
