use rstest::fixture;

use crate::DocumentFormat;
use crate::TestDocument;

pub const SAMPLE_YAML: &str = r#"test_config:
  name: sample
  description: Buffer store smoke test
  shader_template: |
    RWStructuredBuffer<{{TYPE}}> outputBuffer;
    void main() { outputBuffer[0] = {{VALUE}}; }
  generation_comment: Generated by testgen
  global_inputs:
    - name: outputBuffer
      type: ubuffer
      parameters: "data=[0 0 0 0],stride=4"
  global_template_vars:
    TYPE: float
    VALUE: 1.0
  default_filecheck_patterns:
    CHECK:
      - "1.0"
  default_directives:
    - type: COMPARE_COMPUTE
      flags: -vk
      filecheck: CHECK
variants:
  float:
    description: ""
  int:
    description: Integer flavour
    template_vars:
      TYPE: int
      VALUE: 1
    directives:
      - type: COMPARE_COMPUTE
        flags: -vk
        filecheck: CHECK
      - type: INTERPRET
        flags: -dx12
        enabled: false
        disable_reason: 1234
    inputs:
      - name: extra
        type: Texture2D
        parameters: size=4
        declaration: "Texture2D extra;"
    additional_header: "// extra header"
    filecheck_patterns:
      CHECK:
        - "1"
      CHECK-NOT:
        - "CHECK-NOT: error"
"#;

pub const MINIMAL_YAML: &str = r#"test_config:
  name: foo
  shader_template: "void main() {}"
  global_inputs:
    - name: buf
      type: ubuffer
      parameters: "data=[0],stride=4"
  default_directives:
    - type: SIMPLE
      flags: -slang
variants:
  bar: {}
"#;

pub fn parse_yaml(content: &str) -> TestDocument {
	TestDocument::parse(content, DocumentFormat::Yaml, "fixture.yaml")
		.unwrap_or_else(|e| panic!("fixture failed to parse: {e}"))
}

#[fixture]
pub fn sample_document() -> TestDocument {
	parse_yaml(SAMPLE_YAML)
}

#[fixture]
pub fn minimal_document() -> TestDocument {
	parse_yaml(MINIMAL_YAML)
}

/// Write `content` to `config.yaml` inside `dir` and return its path.
pub fn write_config(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
	let path = dir.join("config.yaml");
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("failed to write config: {e}"));
	path
}
