use scry_commands::builtin_registry;
use scry_core::MemImage;
use scry_pipeline::{execute_line, ExecContext, PipelineError};

fn run(line: &str) -> Result<String, PipelineError> {
    let registry = builtin_registry().expect("builtins");
    let image = MemImage::new();
    let ctx = ExecContext {
        image: &image,
        registry: &registry,
    };
    let mut out = Vec::new();
    execute_line(&ctx, line, &mut out)?;
    Ok(String::from_utf8(out).expect("utf8"))
}

#[test]
fn builtins_register_in_declaration_order() {
    let registry = builtin_registry().expect("builtins");
    let canonical: Vec<&str> = registry.list_canonical().map(|(name, _)| name).collect();
    assert_eq!(canonical, ["help", "dbuf"]);
}

#[test]
fn bare_help_lists_one_line_per_command() {
    let out = run("help").expect("help");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        [
            "help - Print command usage",
            "dbuf - Print and filter dbuf hash table entries",
        ]
    );
}

#[test]
fn verbose_help_shows_aliases_under_either_name() {
    for name in ["dbuf", "db"] {
        let out = run(&format!("help {name}")).expect("help");
        assert!(out.starts_with("SUMMARY\n"), "under '{name}'");
        assert!(out.contains("ALIASES\n    dbuf, db\n"), "under '{name}'");
        assert!(out.contains("--has-holds"), "under '{name}'");
    }
}

#[test]
fn help_for_unknown_name_reports_and_succeeds() {
    let out = run("help nosuch").expect("not an error");
    assert_eq!(out, "Unknown command: nosuch\n");
}

#[test]
fn help_mid_pipeline_is_rejected() {
    let err = run("help | dbuf").expect_err("terminal stage misplaced");
    assert!(matches!(err, PipelineError::RendererNotLast { ref command } if command == "help"));
}

#[test]
fn help_without_aliases_omits_the_block() {
    let out = run("help help").expect("help");
    assert!(!out.contains("ALIASES"));
    assert!(out.contains("Without an argument, lists every registered command"));
}
