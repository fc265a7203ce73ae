//! End-to-end generation over crates laid out on disk.

use std::fs;
use std::path::Path;

use fasttrack_generator::{
    DiagnosticId, GENERATED_HEADER, Generator, GeneratorConfig, ReceiverNaming, Severity,
};
use tempfile::TempDir;

const MANIFEST: &str = r#"
[package]
name = "calc-app"
version = "0.1.0"
edition = "2024"

[dependencies]
fasttrack-markers = "0.1"
serde_json = "1"
"#;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn scaffold(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "Cargo.toml", MANIFEST);
    for (rel, text) in files {
        write(temp.path(), rel, text);
    }
    temp
}

fn generator(temp: &TempDir) -> Generator {
    Generator::new(temp.path())
        .config(GeneratorConfig::default())
        .out_dir(temp.path().join("out"))
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<String>().replace(",)", ")")
}

const CALCULATOR: &str = r#"
use fasttrack_markers::{tool_description, tool_name};

#[tool_name("Calculator")]
pub struct CalculatorService;

impl CalculatorService {
    #[tool_description("Adds two numbers")]
    pub fn Add(&self, a: i32, b: i32) -> i32 {
        a + b
    }
}
"#;

#[test]
fn calculator_wrapper_forwards_to_the_service() {
    let temp = scaffold(&[("src/lib.rs", "mod calc;"), ("src/calc.rs", CALCULATOR)]);
    let report = generator(&temp).generate().unwrap();

    assert!(report.output.diagnostics.is_empty(), "{:?}", report.output.diagnostics);
    let text = fs::read_to_string(temp.path().join("out/CalculatorTools.rs")).unwrap();
    syn::parse_file(&text).unwrap();
    assert!(text.starts_with(GENERATED_HEADER));
    assert!(text.contains("#[mcp_server_tool_type]"));
    assert!(text.contains("pub struct CalculatorTools;"));
    assert!(text.contains("#[mcp_server_tool]"));
    assert!(text.contains(r#"#[description("Adds two numbers")]"#));
    assert!(
        squash(&text).contains(&squash(
            "pub fn Add(calculatorService: &crate::calc::CalculatorService, a: i32, b: i32) -> i32 {
                calculatorService.Add(a, b)
            }"
        )),
        "{text}"
    );

    let index = fs::read_to_string(temp.path().join("out/mod.rs")).unwrap();
    assert_eq!(
        squash(&index[GENERATED_HEADER.len()..]),
        squash(r#"pub mod calc { include!("CalculatorTools.rs"); }"#)
    );
}

#[test]
fn empty_tool_name_uses_the_type_name() {
    let temp = scaffold(&[
        ("src/lib.rs", "mod greet;"),
        (
            "src/greet.rs",
            r#"
            use fasttrack_markers::{tool_description, tool_name};

            #[tool_name]
            pub struct Greeting;

            impl Greeting {
                #[tool_description("Says hello")]
                pub fn hello(&self, name: String) -> String {
                    format!("hello {name}")
                }
            }
            "#,
        ),
    ]);
    let report = generator(&temp).generate().unwrap();
    assert_eq!(report.output.wrappers.len(), 1);
    let text = fs::read_to_string(temp.path().join("out/GreetingTools.rs")).unwrap();
    assert!(text.contains("pub struct GreetingTools;"));
    assert!(squash(&text).contains("pubfnhello(greeting:&crate::greet::Greeting,name:String)->String"));
}

#[test]
fn empty_string_tool_name_uses_the_type_name() {
    let temp = scaffold(&[
        ("src/lib.rs", "mod greet;"),
        (
            "src/greet.rs",
            r#"
            use fasttrack_markers::{tool_description, tool_name};

            #[tool_name("")]
            pub struct Greeting;

            impl Greeting {
                #[tool_description("Says hello")]
                pub fn hello(&self) -> String {
                    String::from("hello")
                }
            }
            "#,
        ),
    ]);
    let report = generator(&temp).generate().unwrap();
    let names: Vec<&str> = report
        .output
        .wrappers
        .iter()
        .map(|w| w.artifact.name.as_str())
        .collect();
    assert_eq!(names, vec!["GreetingTools.rs"]);
    let text = fs::read_to_string(temp.path().join("out/GreetingTools.rs")).unwrap();
    assert!(text.contains("pub struct GreetingTools;"), "{text}");
}

#[test]
fn cfg_gated_types_are_gated_in_the_index() {
    let calc = format!(
        r#"{CALCULATOR}
        #[cfg(test)]
        mod tests {{
            use fasttrack_markers::{{tool_description, tool_name}};

            #[tool_name("Mock")]
            pub(crate) struct MockService;

            impl MockService {{
                #[tool_description("Runs the mock")]
                pub fn run(&self) {{}}
            }}
        }}
        "#
    );
    let temp = scaffold(&[
        ("src/lib.rs", "mod calc;\n#[cfg(feature = \"extra\")]\nmod extra;"),
        ("src/calc.rs", &calc),
        (
            "src/extra.rs",
            &CALCULATOR.replace("\"Calculator\"", "\"Extra\""),
        ),
    ]);
    let report = generator(&temp).generate().unwrap();
    assert!(report.output.diagnostics.is_empty(), "{:?}", report.output.diagnostics);

    let index = fs::read_to_string(temp.path().join("out/mod.rs")).unwrap();
    assert_eq!(
        squash(&index[GENERATED_HEADER.len()..]),
        squash(
            r#"pub mod calc {
                include!("CalculatorTools.rs");
                pub mod tests {
                    #[cfg(test)]
                    include!("MockTools.rs");
                }
            }
            pub mod extra {
                #[cfg(feature = "extra")]
                include!("ExtraTools.rs");
            }"#
        )
    );
}

#[test]
fn parameter_order_is_preserved() {
    let temp = scaffold(&[
        ("src/lib.rs", "mod ops;"),
        (
            "src/ops.rs",
            r#"
            use fasttrack_markers::{tool_description, tool_name};
            use serde_json::Value;

            #[tool_name("Ops")]
            pub struct Ops;

            impl Ops {
                #[tool_description("Mixes")]
                pub fn mix(&mut self, z: u8, a: Value, m: Option<&str>) -> bool {
                    true
                }
            }
            "#,
        ),
    ]);
    generator(&temp).generate().unwrap();
    let text = fs::read_to_string(temp.path().join("out/OpsTools.rs")).unwrap();
    assert!(
        squash(&text).contains(
            "pubfnmix(ops:&mutcrate::ops::Ops,z:u8,a:::serde_json::Value,m:Option<&str>)->bool{ops.mix(z,a,m)}"
        ),
        "{text}"
    );
}

#[test]
fn second_run_changes_nothing() {
    let temp = scaffold(&[("src/lib.rs", "mod calc;"), ("src/calc.rs", CALCULATOR)]);
    let first = generator(&temp).generate().unwrap();
    assert_eq!(first.written.len(), 2);

    let before = fs::read_to_string(temp.path().join("out/CalculatorTools.rs")).unwrap();
    let second = generator(&temp).generate().unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 2);
    let after = fs::read_to_string(temp.path().join("out/CalculatorTools.rs")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn removed_markers_prune_stale_wrappers() {
    let temp = scaffold(&[("src/lib.rs", "mod calc;"), ("src/calc.rs", CALCULATOR)]);
    generator(&temp).generate().unwrap();
    write(temp.path(), "src/calc.rs", "pub struct CalculatorService;");

    let report = generator(&temp).generate().unwrap();
    assert_eq!(report.removed, vec![temp.path().join("out/CalculatorTools.rs")]);
    assert!(!temp.path().join("out/CalculatorTools.rs").exists());
    assert!(temp.path().join("out/mod.rs").exists());
}

#[test]
fn siblings_are_isolated() {
    let temp = scaffold(&[
        (
            "src/lib.rs",
            r#"
            mod calc;
            mod broken;
            use fasttrack_markers::{tool_description, tool_name};

            #[tool_name("Root")]
            pub struct RootService;

            impl RootService {
                #[tool_description("At the root")]
                pub fn ping(&self) {}
            }
            "#,
        ),
        ("src/calc.rs", CALCULATOR),
        ("src/broken.rs", "pub struct Oops {"),
    ]);
    let report = generator(&temp).generate().unwrap();
    let names: Vec<&str> = report
        .output
        .wrappers
        .iter()
        .map(|w| w.artifact.name.as_str())
        .collect();
    assert_eq!(names, vec!["CalculatorTools.rs"]);

    let ids: Vec<(DiagnosticId, Severity)> = report
        .output
        .diagnostics
        .iter()
        .map(|d| (d.id, d.severity))
        .collect();
    assert_eq!(
        ids,
        vec![
            (DiagnosticId::SourceParseFailed, Severity::Error),
            (DiagnosticId::MissingNamespace, Severity::Warning),
        ]
    );
}

#[test]
fn missing_marker_crate_reports_once_and_emits_nothing() {
    let temp = scaffold(&[("src/lib.rs", "mod calc;"), ("src/calc.rs", CALCULATOR)]);
    write(
        temp.path(),
        "Cargo.toml",
        "[package]\nname = \"calc-app\"\nversion = \"0.1.0\"\n",
    );
    let report = generator(&temp).generate().unwrap();
    assert!(report.output.wrappers.is_empty());
    assert_eq!(report.output.diagnostics.len(), 1);
    let diagnostic = &report.output.diagnostics[0];
    assert_eq!(diagnostic.id, DiagnosticId::MarkerTypesUnresolved);
    assert!(diagnostic.location.is_none());
    assert!(!temp.path().join("out/CalculatorTools.rs").exists());
}

#[test]
fn snake_case_naming_and_config_file() {
    let temp = scaffold(&[("src/lib.rs", "mod calc;"), ("src/calc.rs", CALCULATOR)]);
    write(
        temp.path(),
        "fasttrack.json",
        r#"{ "receiver_naming": "snake_case", "host": { "tool": "rmcp::tool" } }"#,
    );
    let report = Generator::new(temp.path())
        .out_dir(temp.path().join("out"))
        .generate()
        .unwrap();
    assert_eq!(report.output.wrappers.len(), 1);
    let text = &report.output.wrappers[0].artifact.text;
    assert!(text.contains("#[rmcp::tool]"), "{text}");
    assert!(squash(text).contains("calculator_service.Add(a,b)"), "{text}");
    assert!(!text.contains("allow(non_snake_case)"));

    let config = GeneratorConfig {
        receiver_naming: ReceiverNaming::FirstLower,
        ..GeneratorConfig::default()
    };
    let output = Generator::new(temp.path()).config(config).check().unwrap();
    assert!(squash(&output.wrappers[0].artifact.text).contains("calculatorService.Add(a,b)"));
}

#[test]
fn wrappers_in_nested_modules_nest_in_the_index() {
    let temp = scaffold(&[
        ("src/lib.rs", "pub mod services;"),
        ("src/services/mod.rs", "pub mod math;"),
        (
            "src/services/math.rs",
            &CALCULATOR.replace("\"Calculator\"", "\"Math\""),
        ),
    ]);
    generator(&temp).generate().unwrap();
    let index = fs::read_to_string(temp.path().join("out/mod.rs")).unwrap();
    assert_eq!(
        squash(&index[GENERATED_HEADER.len()..]),
        squash(r#"pub mod services { pub mod math { include!("MathTools.rs"); } }"#)
    );
    let text = fs::read_to_string(temp.path().join("out/MathTools.rs")).unwrap();
    assert!(text.contains("&crate::services::math::CalculatorService"), "{text}");
}
