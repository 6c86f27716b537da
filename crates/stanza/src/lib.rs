//! Stanza - placeholder substitution templates with repeatable block rows.
//!
//! Stanza fills `{name}` placeholders in a text with values attached to a
//! [`Template`], and expands marked regions of the text once per input
//! record. It is deliberately small:
//!
//! - Literal name-to-value substitution, repeated in bounded passes so values
//!   may themselves contain placeholders
//! - One level of repeatable block rows, delimited by
//!   `<!-- BEGIN name -->` / `<!-- END name -->` markers
//! - Child templates, inlined either rendered or raw
//!
//! There are no conditionals, expressions or filters.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use stanza::Template;
//!
//! let mut page = Template::named("page").with_content(
//!     "{title}\n<!-- BEGIN row -->- {item} x{qty}\n<!-- END row -->",
//! );
//! page.extract_block_rows(true)?;
//!
//! page.add_variable("title", "Order", true)?;
//! page.parse_block_row_value(
//!     "row",
//!     &json!([{"item": "apple", "qty": 3}, {"item": "pear", "qty": 1}]),
//!     None,
//! )?;
//!
//! assert_eq!(page.render(true), "Order\n- apple x3\n- pear x1\n");
//! # Ok::<(), stanza::TemplateError>(())
//! ```
//!
//! # Rendering Semantics
//!
//! ```text
//! out = content
//! repeat up to recursion_depth times:
//!     replace every {name} that has a child value
//!     stop early once a pass replaces nothing
//! if strip_unresolved: delete every remaining {name}
//! ```
//!
//! A child added later under an existing name replaces the earlier value.
//!
//! # Placeholder Syntax
//!
//! | Token | Placeholder? |
//! |-------|--------------|
//! | `{name}`, `{_x1}`, `{café}` | yes |
//! | `{3rd}`, `{ name }`, `{a.b}`, `{}` | no, literal text |

pub mod depth;
pub mod error;
pub mod markers;
pub mod scanner;
pub mod source;
pub mod template;
pub mod value;

pub use depth::RecursionDepth;
pub use error::{Result, TemplateError};
pub use scanner::{find_placeholders, template_var_definitions, Placeholder, VarDefinitions};
pub use source::{ContentSource, FileSource, TEMPLATE_EXTENSION};
pub use template::{BlockRows, Template};
pub use value::{normalize_scalar, records_from_value, Child, Record};
