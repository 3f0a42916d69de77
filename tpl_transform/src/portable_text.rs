//! Portable Text to Markdown.
//!
//! Portable Text is a JSON block format: a list of blocks, each with a
//! `_type`. Text blocks (`_type: "block"`) hold `children` spans with
//! `marks`, a `style` and optional list membership; marks either name a
//! decorator (`strong`, `em`, ...) or reference an entry in `markDefs`.

use crate::TransformError;
use crate::TransformResult;
use crate::Value;

/// Deepest list nesting rendered. Deeper `level` values are flattened to it.
pub const MAX_LIST_DEPTH: usize = 10;

/// Convert a decoded Portable Text document to Markdown. A single block is
/// accepted in place of a list.
pub fn to_markdown(value: &Value) -> TransformResult<String> {
	let blocks: &[Value] = match value {
		Value::Sequence(blocks) => blocks,
		Value::Mapping(_) => std::slice::from_ref(value),
		Value::Null => &[],
		other => {
			return Err(TransformError::PortableText(format!(
				"expected a list of blocks, received {other}"
			)));
		}
	};

	let mut out = String::new();
	let mut previous_was_list = false;
	let mut list_counters: Vec<(String, usize)> = Vec::new();

	for block in blocks {
		let Some(rendered) = render_block(block, &mut list_counters)? else {
			continue;
		};
		let is_list = rendered.is_list_item;
		if !is_list {
			list_counters.clear();
		}

		if !out.is_empty() {
			out.push_str(if is_list && previous_was_list { "\n" } else { "\n\n" });
		}
		out.push_str(&rendered.text);
		previous_was_list = is_list;
	}

	if !out.is_empty() {
		out.push('\n');
	}

	Ok(out)
}

struct Rendered {
	text: String,
	is_list_item: bool,
}

fn render_block(
	block: &Value,
	list_counters: &mut Vec<(String, usize)>,
) -> TransformResult<Option<Rendered>> {
	let Value::Mapping(_) = block else {
		return Err(TransformError::PortableText(format!(
			"expected a block, received {block}"
		)));
	};

	let kind = block.get("_type").and_then(Value::as_str).unwrap_or("block");
	let text = match kind {
		"block" => return render_text_block(block, list_counters).map(Some),
		"image" => render_image(block),
		"code" => render_code(block),
		other => {
			tracing::debug!(block_type = other, "skipping unsupported portable text block");
			return Ok(None);
		}
	};

	Ok(Some(Rendered {
		text,
		is_list_item: false,
	}))
}

fn render_text_block(
	block: &Value,
	list_counters: &mut Vec<(String, usize)>,
) -> TransformResult<Rendered> {
	let mark_defs = block
		.get("markDefs")
		.and_then(Value::as_sequence)
		.unwrap_or_default();

	let mut text = String::new();
	for child in block.get("children").and_then(Value::as_sequence).unwrap_or_default() {
		text.push_str(&render_span(child, mark_defs)?);
	}

	if let Some(list) = block.get("listItem").and_then(Value::as_str) {
		let level = block
			.get("level")
			.and_then(|level| {
				match level {
					Value::Number(n) => n.as_i64(),
					_ => None,
				}
			})
			.and_then(|level| usize::try_from(level).ok())
			.unwrap_or(1)
			.clamp(1, MAX_LIST_DEPTH);

		// One counter per nesting level, restarted when the list kind changes.
		list_counters.resize(level, (String::new(), 0));
		let (kind, counter) = &mut list_counters[level - 1];
		if kind != list {
			*kind = list.to_string();
			*counter = 0;
		}
		*counter += 1;

		let indent = "  ".repeat(level - 1);
		let marker = if list == "number" {
			format!("{counter}. ")
		} else {
			"- ".to_string()
		};

		return Ok(Rendered {
			text: format!("{indent}{marker}{text}"),
			is_list_item: true,
		});
	}

	let style = block.get("style").and_then(Value::as_str).unwrap_or("normal");
	let text = match style {
		"h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
			let level = style[1..].parse::<usize>().unwrap_or(1);
			format!("{} {text}", "#".repeat(level))
		}
		"blockquote" => {
			text.lines()
				.map(|line| format!("> {line}"))
				.collect::<Vec<_>>()
				.join("\n")
		}
		_ => text,
	};

	Ok(Rendered {
		text,
		is_list_item: false,
	})
}

fn render_span(span: &Value, mark_defs: &[Value]) -> TransformResult<String> {
	let Value::Mapping(_) = span else {
		return Err(TransformError::PortableText(format!(
			"expected a span, received {span}"
		)));
	};

	let mut text = span
		.get("text")
		.and_then(Value::as_str)
		.unwrap_or_default()
		.to_string();
	let marks = span.get("marks").and_then(Value::as_sequence).unwrap_or_default();

	for mark in marks.iter().filter_map(Value::as_str) {
		text = match mark {
			"strong" => format!("**{text}**"),
			"em" => format!("_{text}_"),
			"code" => format!("`{text}`"),
			"strike-through" => format!("~~{text}~~"),
			"underline" => text,
			key => apply_mark_def(text, key, mark_defs),
		};
	}

	Ok(text)
}

fn apply_mark_def(text: String, key: &str, mark_defs: &[Value]) -> String {
	let definition = mark_defs
		.iter()
		.find(|def| def.get("_key").and_then(Value::as_str) == Some(key));

	match definition {
		Some(def) if def.get("_type").and_then(Value::as_str) == Some("link") => {
			let href = def.get("href").and_then(Value::as_str).unwrap_or_default();
			format!("[{text}]({href})")
		}
		_ => text,
	}
}

fn render_image(block: &Value) -> String {
	let alt = block.get("alt").and_then(Value::as_str).unwrap_or_default();
	let url = block
		.get("asset")
		.and_then(|asset| asset.get("url").or_else(|| asset.get("_ref")))
		.and_then(Value::as_str)
		.unwrap_or_default();

	format!("![{alt}]({url})")
}

fn render_code(block: &Value) -> String {
	let language = block.get("language").and_then(Value::as_str).unwrap_or_default();
	let code = block.get("code").and_then(Value::as_str).unwrap_or_default();

	format!("```{language}\n{code}\n```")
}
