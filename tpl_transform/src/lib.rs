//! `tpl_transform` implements the data and markup transform functions of a
//! static site template engine: decoding CSV, JSON, TOML and YAML into a
//! generic value, rendering TeX math to MathML, and converting Portable Text
//! to Markdown.
//!
//! ## Functions
//!
//! - [`unmarshal()`] decodes text or a [`Resource`] into a [`Value`]. The
//!   format comes from the `format` option, the resource's media type or
//!   extension, or the content itself. CSV is read with Go `encoding/csv`
//!   quoting rules and can produce rows or header-keyed maps.
//! - [`MathRenderer::to_math`] renders an expression through a
//!   [`MathEngine`], by default [`KatexEngine`] over `katex-rs`, and resolves
//!   the engine's diagnostics against a [`StrictPolicy`]: a [`StrictMode`],
//!   optionally refined per diagnostic code.
//! - [`portable_text::to_markdown`] converts decoded Portable Text blocks.
//!
//! Every function takes a loosely-typed [`OptionsBag`] whose keys match
//! case-insensitively.
//!
//! ## Templates
//!
//! [`template::register`] installs the functions into a
//! [`minijinja::Environment`], along with `try`, which captures a failing
//! call as a map with `Err` and `Value` keys. Math markup is written to the
//! output unescaped, and reading `.Err` on it fails the render.
//!
//! ```
//! use std::sync::Arc;
//!
//! use tpl_transform::MathRenderer;
//! use tpl_transform::template;
//!
//! let mut env = minijinja::Environment::new();
//! template::register(&mut env, Arc::new(MathRenderer::default()));
//!
//! let output = env
//! 	.render_str(r#"{{ "a,b\n1,2" | unmarshal({"format": "csv"}) | jsonify }}"#, ())
//! 	.unwrap();
//! assert_eq!(output, r#"[["a","b"],["1","2"]]"#);
//! ```

pub use attempt::*;
pub use error::*;
pub use math::KatexEngine;
pub use math::Markup;
pub use math::MathEngine;
pub use math::MathOptions;
pub use math::MathRenderer;
pub use options::*;
pub use strict::Diagnostic;
pub use strict::StrictMode;
pub use strict::StrictPolicy;
pub use unmarshal::*;
pub use value::*;

mod attempt;
pub mod decode;
mod error;
pub mod math;
mod options;
pub mod portable_text;
pub mod strict;
pub mod template;
mod unmarshal;
mod value;

#[cfg(test)]
mod __fixtures;
