use std::sync::Arc;

use crate::MathRenderer;
use crate::OptionsBag;
use crate::Resource;
use crate::Value;
use crate::template;

pub const PETS_CSV: &str = "name,type,breed,age\nSpot,dog,Collie,3\nFelix,cat,Malicious,7";

pub const PETS_AS_MAPS: &str = r#"[{"age":"3","breed":"Collie","name":"Spot","type":"dog"},{"age":"7","breed":"Malicious","name":"Felix","type":"cat"}]"#;

pub const PETS_AS_ROWS: &str =
	r#"[["name","type","breed","age"],["Spot","dog","Collie","3"],["Felix","cat","Malicious","7"]]"#;

pub const LAZY_PETS_CSV: &str = r#"name,description,age
Spot,a nice dog,3
Rover,"a big dog",5
Felix,a "malicious" cat,7
Bella,"an "evil" cat",9
Scar,"a "dead cat",11
"#;

pub const INDENTED_YAML: &str = "\n  a:\n    b: 1\n  c:\n    d: 2\n";

pub const UNDEFINED_CONTROL_SEQUENCE: &str = "c = \\foo{a^2 + b^2}";

pub const LARGE_ALIGN: &str = r"\begin{align*} \frac{\pi^2}{6}&=\frac{4}{3}\frac{(\arcsin 1)^2}{2}\\ &=\frac{4}{3}\int_0^1\frac{\arcsin x}{\sqrt{1-x^2}}\,dx\\ &=\frac{4}{3}\int_0^1\frac{x+\sum_{n=1}^{\infty}\frac{(2n-1)!!}{(2n)!!}\frac{x^{2n+1}}{2n+1}}{\sqrt{1-x^2}}\,dx\\ &=\frac{4}{3}+\frac{4}{3}\sum_{n=1}^{\infty}\frac{(2n-1)!!}{(2n)!!(2n+1)}\left[\frac{(2n)!!}{(2n+1)!!}\right]\\ &=\frac{4}{3}\left(\sum_{n=1}^{\infty}\frac{1}{n^2}-\frac{1}{4}\sum_{n=1}^{\infty}\frac{1}{n^2}\right)\\ &=\sum_{n=1}^{\infty}\frac{1}{n^2} \end{align*}";

pub const HEADING_BLOCKS: &str = r#"[
  {
    "_key": "a",
    "_type": "block",
    "children": [
      {
        "_key": "b",
        "_type": "span",
        "marks": [],
        "text": "Heading 2"
      }
    ],
    "markDefs": [],
    "style": "h2"
  }
]"#;

pub const RICH_BLOCKS: &str = r#"[
  {
    "_type": "block",
    "style": "normal",
    "markDefs": [{ "_key": "l1", "_type": "link", "href": "https://example.com" }],
    "children": [
      { "_type": "span", "text": "Read ", "marks": [] },
      { "_type": "span", "text": "this", "marks": ["strong"] },
      { "_type": "span", "text": " and ", "marks": [] },
      { "_type": "span", "text": "that", "marks": ["l1"] }
    ]
  },
  {
    "_type": "block",
    "listItem": "bullet",
    "level": 1,
    "children": [{ "_type": "span", "text": "one", "marks": ["em"] }]
  },
  {
    "_type": "block",
    "listItem": "bullet",
    "level": 2,
    "children": [{ "_type": "span", "text": "nested", "marks": ["code"] }]
  },
  {
    "_type": "block",
    "listItem": "number",
    "level": 1,
    "children": [{ "_type": "span", "text": "two", "marks": [] }]
  },
  {
    "_type": "code",
    "language": "rust",
    "code": "fn main() {}"
  },
  {
    "_type": "block",
    "style": "blockquote",
    "children": [{ "_type": "span", "text": "quoted", "marks": ["strike-through"] }]
  }
]"#;

pub fn options<const N: usize>(pairs: [(&str, Value); N]) -> OptionsBag {
	pairs.into_iter().collect()
}

pub fn pets_resource() -> Resource {
	Resource::new("pets.csv", PETS_CSV)
}

pub fn json(text: &str) -> Value {
	Value::from(serde_json::from_str::<serde_json::Value>(text).unwrap())
}

pub fn template_env() -> minijinja::Environment<'static> {
	let mut env = minijinja::Environment::new();
	template::register(&mut env, Arc::new(MathRenderer::default()));
	env
}

pub fn to_math(source: &str, options: &OptionsBag) -> crate::TransformResult<crate::Markup> {
	MathRenderer::default().to_math(source, options)
}
