//! Template nodes, the substitution loop and block row expansion.
//!
//! A [`Template`] owns raw content, a set of named [children](Child) and a set
//! of extracted [block rows](BlockRows). Rendering substitutes `{name}`
//! placeholders in the content with the children's values, repeating the
//! substitution until nothing is left to resolve or the node's
//! [`RecursionDepth`] is used up.
//!
//! # Rendering
//!
//! ```text
//! content:  "Hello {who}{suffix}"
//! children: who = "{first} {last}", first = "Ada", last = "Lovelace", suffix = "!"
//!
//! pass 1:   "Hello {first} {last}!"
//! pass 2:   "Hello Ada Lovelace!"
//! pass 3:   no placeholders left, stop
//! ```
//!
//! Placeholders with no matching child are left in place, unless the render
//! is asked to strip them, in which case a final cleanup pass deletes every
//! remaining placeholder.
//!
//! # Block rows
//!
//! ```rust
//! use serde_json::json;
//! use stanza::Template;
//!
//! let mut page = Template::named("page").with_content(
//!     "<ul><!-- BEGIN item --><li>{label}</li><!-- END item --></ul>",
//! );
//! page.extract_block_rows(true).unwrap();
//!
//! page.parse_block_row_value("item", &json!([{"label": "one"}, {"label": "two"}]), None)
//!     .unwrap();
//!
//! assert_eq!(page.render(true), "<ul><li>one</li><li>two</li></ul>");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::depth::RecursionDepth;
use crate::error::{Result, TemplateError};
use crate::markers;
use crate::scanner;
use crate::value::{normalize_scalar, records_from_value, Child, Record};

/// A named template with content, children and block rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    name: String,
    content: Option<String>,
    children: HashMap<String, Child>,
    block_rows: BlockRows,
    recursion_depth: RecursionDepth,
    pub(crate) origin: Option<PathBuf>,
    pub(crate) dir: Option<PathBuf>,
}

impl Template {
    /// Creates an unnamed template with no content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named template with no content.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the initial content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the substitution pass limit.
    pub fn with_recursion_depth(mut self, depth: RecursionDepth) -> Self {
        self.recursion_depth = depth;
        self
    }

    /// The template's name; empty when unnamed.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The raw content, if any has been set.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Replaces the raw content.
    ///
    /// Block rows are not re-extracted; call [`Template::extract_block_rows`]
    /// when the new content carries markers.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    /// Named children visible to this template's placeholders.
    pub fn children(&self) -> &HashMap<String, Child> {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Child> {
        self.children.get(name)
    }

    /// Extracted, not yet expanded block rows.
    pub fn block_rows(&self) -> &BlockRows {
        &self.block_rows
    }

    /// Where the content was loaded from, if it came from a source.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Directory containing the origin file, if loaded from disk.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn recursion_depth(&self) -> RecursionDepth {
        self.recursion_depth
    }

    /// Sets the substitution pass limit.
    ///
    /// # Errors
    ///
    /// [`TemplateError::InvalidRecursionDepth`] unless `depth` is positive.
    pub fn set_recursion_depth(&mut self, depth: i64) -> Result<()> {
        self.recursion_depth = RecursionDepth::new(depth)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    /// Attaches `node` as a child under its own name.
    ///
    /// The node's children are copied into this template first, so values the
    /// node carries stay visible here and override same-named values already
    /// present. The node itself is then stored as text: rendered when
    /// `render_now` is true, or as its raw content otherwise, in which case
    /// its placeholders resolve against this template's children.
    ///
    /// A later child with the same name replaces the earlier one.
    ///
    /// # Errors
    ///
    /// [`TemplateError::MissingName`] if the node is unnamed.
    pub fn add_child(&mut self, node: Template, render_now: bool) -> Result<()> {
        if node.name.is_empty() {
            return Err(TemplateError::MissingName);
        }

        let value = if render_now {
            node.render(false)
        } else {
            node.content.clone().unwrap_or_default()
        };

        let Template { name, children, .. } = node;
        self.children.extend(children);
        self.children.insert(name, Child::Literal(value));
        Ok(())
    }

    /// Attaches `node` as a live child, rendered each time this template is.
    ///
    /// Unlike [`Template::add_child`], the node keeps its own children and is
    /// rendered with the same strip setting as the parent.
    ///
    /// # Errors
    ///
    /// [`TemplateError::MissingName`] if the node is unnamed.
    pub fn add_node(&mut self, node: Template) -> Result<()> {
        if node.name.is_empty() {
            return Err(TemplateError::MissingName);
        }
        self.children
            .insert(node.name.clone(), Child::Node(Box::new(node)));
        Ok(())
    }

    /// Sets a single variable.
    ///
    /// Strings and numbers are used as text, booleans become `1`/`0` and
    /// `null` becomes empty.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::InvalidVariableValue`] for arrays and objects
    /// - [`TemplateError::MissingName`] if `name` is empty
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        render_now: bool,
    ) -> Result<()> {
        let name = name.into();
        let text = normalize_scalar(&name, &value.into())?;
        self.add_child(Template::named(name).with_content(text), render_now)
    }

    /// Sets every variable in `vars`.
    ///
    /// Nested mappings are flattened: their entries are set under their own
    /// keys. The whole mapping is checked before anything is set.
    ///
    /// # Errors
    ///
    /// Same as [`Template::add_variable`], for any leaf.
    pub fn add_variable_map(
        &mut self,
        vars: &serde_json::Map<String, Value>,
        render_now: bool,
    ) -> Result<()> {
        self.add_variable_map_with_prefix(vars, "", render_now)
    }

    /// Sets every variable in `vars` with `prefix` prepended to each key.
    ///
    /// The prefix also applies to the leaves of nested mappings.
    pub fn add_variable_map_with_prefix(
        &mut self,
        vars: &serde_json::Map<String, Value>,
        prefix: &str,
        render_now: bool,
    ) -> Result<()> {
        let mut leaves = Vec::new();
        flatten_variables(vars, prefix, &mut leaves)?;
        for (name, text) in leaves {
            self.add_child(Template::named(name).with_content(text), render_now)?;
        }
        Ok(())
    }

    /// Removes all children and block rows. Name, content and depth are kept.
    pub fn reset(&mut self) {
        self.children.clear();
        self.block_rows.clear();
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Renders the content against this template's children.
    ///
    /// Children that are nested nodes are rendered first, with the same
    /// `strip_unresolved` setting. Substitution then runs pass after pass
    /// until a pass resolves nothing or the recursion depth is reached, so
    /// self-referencing values terminate. With `strip_unresolved`, any
    /// placeholder still present afterwards is removed.
    pub fn render(&self, strip_unresolved: bool) -> String {
        let mut out = self.content.clone().unwrap_or_default();

        let values: HashMap<String, String> = self
            .children
            .iter()
            .map(|(name, child)| {
                let text = match child {
                    Child::Literal(text) => text.clone(),
                    Child::Node(node) => node.render(strip_unresolved),
                };
                (name.clone(), text)
            })
            .collect();

        for _ in 0..self.recursion_depth.get() {
            match scanner::substitute(&out, &values) {
                Some(next) => out = next,
                None => break,
            }
        }

        if strip_unresolved {
            out = scanner::strip_placeholders(&out);
        }
        out
    }

    // ------------------------------------------------------------------
    // Block rows
    // ------------------------------------------------------------------

    /// Lists the block row names declared in the content, in extraction order.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::InvalidNesting`] if BEGIN and END markers don't pair
    /// - [`TemplateError::InvalidBlockName`] if a block name can't be used as
    ///   a placeholder
    pub fn block_row_names(&self) -> Result<Vec<String>> {
        markers::block_names(self.content.as_deref().unwrap_or_default())
    }

    /// Extracts one block row from the content.
    ///
    /// The region is replaced by a `{handle}` placeholder and stored as a
    /// block row named `handle`, replacing any earlier definition.
    ///
    /// # Errors
    ///
    /// [`TemplateError::BlockRegionNotFound`] if the region isn't present.
    pub fn extract_block_row(&mut self, handle: &str, remove_markers: bool) -> Result<&Template> {
        let region = markers::extract_region(
            self.content.as_deref().unwrap_or_default(),
            handle,
            remove_markers,
        )?;
        self.content = Some(region.rewritten);
        let row = self.block_row_node(handle, region.inner);
        Ok(self.block_rows.insert(handle, row))
    }

    /// Extracts every block row declared in the content.
    ///
    /// Blocks are processed in [`Template::block_row_names`] order. Nothing is
    /// changed if any marker is unbalanced or any region is missing. Running
    /// it again on already-extracted content finds no markers and changes
    /// nothing.
    pub fn extract_block_rows(&mut self, remove_markers: bool) -> Result<&BlockRows> {
        let names = self.block_row_names()?;
        if names.is_empty() {
            return Ok(&self.block_rows);
        }

        let mut content = self.content.clone().unwrap_or_default();
        let mut staged = Vec::with_capacity(names.len());
        for name in names {
            let region = markers::extract_region(&content, &name, remove_markers)?;
            content = region.rewritten;
            staged.push((name, region.inner));
        }

        log::debug!(
            "extracted {} block row(s) from template '{}'",
            staged.len(),
            self.name
        );

        self.content = Some(content);
        for (name, inner) in staged {
            let row = self.block_row_node(&name, inner);
            self.block_rows.insert(&name, row);
        }
        Ok(&self.block_rows)
    }

    fn block_row_node(&self, handle: &str, content: String) -> Template {
        Template::named(handle)
            .with_content(content)
            .with_recursion_depth(self.recursion_depth)
    }

    /// Renders this template once per record and concatenates the results.
    ///
    /// Each record's fields are set as variables, the content is rendered
    /// with unresolved placeholders stripped, and the template is reset
    /// before the next record so fields never leak between records.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::EmptyRecordSet`] if `records` is empty
    /// - [`TemplateError::InvalidVariableValue`] for a non-scalar field
    pub fn render_rows(&mut self, records: &[Record]) -> Result<String> {
        if records.is_empty() {
            return Err(TemplateError::EmptyRecordSet);
        }

        let mut rendered = String::new();
        for record in records {
            self.add_variable_map(record, true)?;
            rendered.push_str(&self.render(true));
            self.reset();
        }
        Ok(rendered)
    }

    /// [`Template::render_rows`] for a dynamic record set.
    ///
    /// See [`records_from_value`] for the accepted shapes.
    pub fn render_rows_value(&mut self, records: &Value) -> Result<String> {
        let records = records_from_value(records)?;
        self.render_rows(&records)
    }

    /// Expands the block row `handle` with `records` and stores the result.
    ///
    /// The rendered rows are set as a literal child named `target_name`, or
    /// `handle` when no target is given, so the `{handle}` placeholder left by
    /// extraction picks them up. The block row is consumed: expanding the same
    /// handle again fails until it is re-extracted.
    ///
    /// Returns the rendered rows.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::BlockHandleNotFound`] if `handle` was never extracted
    ///   or was already expanded
    /// - [`TemplateError::MissingName`] if `target_name` is empty
    /// - any error from [`Template::render_rows`]; the block row is kept
    pub fn parse_block_row(
        &mut self,
        handle: &str,
        records: &[Record],
        target_name: Option<&str>,
    ) -> Result<String> {
        let block = self
            .block_rows
            .get_mut(handle)
            .ok_or_else(|| TemplateError::BlockHandleNotFound {
                handle: handle.to_string(),
            })?;

        let target = target_name.unwrap_or(handle);
        if target.is_empty() {
            return Err(TemplateError::MissingName);
        }
        let rendered = block.render_rows(records)?;
        self.block_rows.remove(handle);

        log::debug!(
            "expanded block row '{}' of template '{}' with {} record(s) into '{}'",
            handle,
            self.name,
            records.len(),
            target
        );

        self.children
            .insert(target.to_string(), Child::Literal(rendered.clone()));
        Ok(rendered)
    }

    /// [`Template::parse_block_row`] for a dynamic record set.
    pub fn parse_block_row_value(
        &mut self,
        handle: &str,
        records: &Value,
        target_name: Option<&str>,
    ) -> Result<String> {
        let records = records_from_value(records)?;
        self.parse_block_row(handle, &records, target_name)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

fn flatten_variables(
    vars: &serde_json::Map<String, Value>,
    prefix: &str,
    leaves: &mut Vec<(String, String)>,
) -> Result<()> {
    for (key, value) in vars {
        match value {
            Value::Object(nested) => flatten_variables(nested, prefix, leaves)?,
            _ => {
                let name = format!("{prefix}{key}");
                if name.is_empty() {
                    return Err(TemplateError::MissingName);
                }
                let text = normalize_scalar(&name, value)?;
                leaves.push((name, text));
            }
        }
    }
    Ok(())
}

/// Block rows of a template, keyed by handle, in extraction order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockRows {
    rows: Vec<Template>,
}

impl BlockRows {
    /// The block row stored under `handle`.
    pub fn get(&self, handle: &str) -> Option<&Template> {
        self.rows.iter().find(|row| row.name == handle)
    }

    fn get_mut(&mut self, handle: &str) -> Option<&mut Template> {
        self.rows.iter_mut().find(|row| row.name == handle)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.get(handle).is_some()
    }

    /// Handles in extraction order.
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stores `row` under `handle` as the most recently extracted row.
    fn insert(&mut self, handle: &str, row: Template) -> &Template {
        self.remove(handle);
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    fn remove(&mut self, handle: &str) -> Option<Template> {
        let index = self.rows.iter().position(|r| r.name == handle)?;
        Some(self.rows.remove(index))
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}
