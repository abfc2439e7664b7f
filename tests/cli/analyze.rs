use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, run};

const INDEX: &str = "{{ partial \"header.html\" . }}\n{{ if .Params.toc }}\n{{ partial \"toc.html\" . }}\n{{ end }}\n";

fn basic_site() -> Result<CliTest> {
    CliTest::with_files(&[
        ("layouts/index.html", INDEX),
        ("layouts/_partials/header.html", "<header>{{ .Site.Title }}</header>"),
        ("layouts/_partials/toc.html", "{{ .TableOfContents }}"),
    ])
}

#[test]
fn test_analyze_tree_output() -> Result<()> {
    let test = basic_site()?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.code, Some(0));
    assert!(result.stdout.contains(
        "Templates (1)\n\
         └── index.html\n    \
         ├── includes _partials/header.html (line 1)\n    \
         └── includes _partials/toc.html (line 3, conditional)\n"
    ));
    assert!(result.stdout.contains("Partials (2)\n"));
    assert_eq!(result.stderr, "✓ Analyzed 3 templates - no issues found\n");

    Ok(())
}

#[test]
fn test_analyze_json_output() -> Result<()> {
    let test = basic_site()?;
    let result = run(test.analyze_command().args(["--format", "json"]))?;

    assert_eq!(result.code, Some(0));
    let value: Value = serde_json::from_str(&result.stdout)?;
    assert_eq!(value["graph_type"], "hugo_template_dependencies");
    assert_eq!(value["metadata"]["generator"], "hugo-deps");
    assert_eq!(value["metadata"]["totalNodes"], 3);
    assert_eq!(value["metadata"]["totalEdges"], 2);
    assert_eq!(
        value["metadata"]["project_path"],
        test.root().display().to_string()
    );
    assert_eq!(value["statistics"]["has_cycles"], false);

    Ok(())
}

#[test]
fn test_analyze_mermaid_output() -> Result<()> {
    let test = basic_site()?;
    let result = run(test.analyze_command().args(["-f", "mermaid"]))?;

    assert!(result.stdout.starts_with("graph TD\n"));
    assert!(result.stdout.contains("    index_html -->|includes| partials_header_html\n"));
    assert!(result.stdout.contains("    index_html -.->|includes| partials_toc_html\n"));

    Ok(())
}

#[test]
fn test_analyze_writes_output_file() -> Result<()> {
    let test = basic_site()?;
    let result = run(test.analyze_command().args(["-f", "dot", "-o", "graph.dot"]))?;

    assert_eq!(result.code, Some(0));
    assert_eq!(result.stdout, "");
    assert!(result.stderr.contains("Wrote graph (3 nodes, 2 edges) to graph.dot"));

    let dot = test.read_file("graph.dot")?;
    assert!(dot.starts_with("digraph hugo_dependencies {\n"));
    assert!(dot.ends_with("}\n"));

    Ok(())
}

#[test]
fn test_unresolved_dependency_is_warning() -> Result<()> {
    let test = CliTest::with_files(&[(
        "layouts/index.html",
        "<main>\n  {{ partial \"missing.html\" . }}\n</main>\n",
    )])?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.code, Some(0));
    assert!(result.stdout.contains("Unresolved (1)\n└── missing.html\n"));
    assert!(
        result
            .stderr
            .contains("warning: \"missing.html\"  unresolved-dependency")
    );
    assert!(result.stderr.contains(&format!(
        "--> {}/layouts/index.html:2:15",
        test.root().display()
    )));
    assert!(
        result
            .stderr
            .contains("= hint: partials are looked up in layouts/_partials/")
    );
    assert!(result.stderr.contains("1 problem (0 errors, 1 warning)"));

    Ok(())
}

#[test]
fn test_quiet_suppresses_diagnostics() -> Result<()> {
    let test = CliTest::with_files(&[("layouts/index.html", "{{ partial \"missing.html\" . }}")])?;
    let result = run(test.analyze_command().arg("-q"))?;

    assert_eq!(result.code, Some(0));
    assert!(result.stdout.contains("index.html"));
    assert_eq!(result.stderr, "");

    Ok(())
}

#[test]
fn test_ignore_flag() -> Result<()> {
    let test = CliTest::with_files(&[
        ("layouts/index.html", "<html></html>"),
        ("layouts/_drafts/wip.html", "{{ partial \"nope.html\" . }}"),
    ])?;
    let result = run(test.analyze_command().args(["--ignore", "**/_drafts/**"]))?;

    assert_eq!(result.code, Some(0));
    assert_eq!(result.stderr, "✓ Analyzed 1 template - no issues found\n");

    Ok(())
}

#[test]
fn test_config_file_ignores() -> Result<()> {
    let test = CliTest::with_files(&[
        (".hugodepsrc.json", r#"{ "ignores": ["layouts/_drafts"] }"#),
        ("layouts/index.html", "<html></html>"),
        ("layouts/_drafts/wip.html", "{{ partial \"nope.html\" . }}"),
    ])?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.stderr, "✓ Analyzed 1 template - no issues found\n");

    Ok(())
}

#[test]
fn test_invalid_config_file_is_fatal() -> Result<()> {
    let test = CliTest::with_files(&[
        (".hugodepsrc.json", r#"{ "ignores": ["[broken"] }"#),
        ("layouts/index.html", "<html></html>"),
    ])?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.code, Some(2));
    assert!(result.stderr.contains("Invalid glob pattern in 'ignores'"));

    Ok(())
}

#[test]
fn test_invalid_site_config_is_fatal() -> Result<()> {
    let test = CliTest::with_files(&[
        ("hugo.toml", "[module\n"),
        ("layouts/index.html", "<html></html>"),
    ])?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.code, Some(2));
    assert_eq!(result.stdout, "");
    assert!(
        result
            .stderr
            .starts_with("Error: Failed to load Hugo site configuration")
    );

    Ok(())
}

#[test]
fn test_missing_project_path_is_fatal() -> Result<()> {
    let test = CliTest::new()?;
    let result = run(test.analyze_command().arg("does-not-exist"))?;

    assert_eq!(result.code, Some(2));
    assert!(result.stderr.contains("Project path does not exist: does-not-exist"));

    Ok(())
}

#[test]
fn test_unknown_format_is_usage_error() -> Result<()> {
    let test = basic_site()?;
    let result = run(test.analyze_command().args(["-f", "svg"]))?;

    assert_eq!(result.code, Some(2));

    Ok(())
}

#[test]
fn test_project_path_argument() -> Result<()> {
    let test = CliTest::with_files(&[("site/layouts/index.html", "<html></html>")])?;
    let result = run(test.analyze_command().arg("site"))?;

    assert_eq!(result.code, Some(0));
    assert!(result.stdout.starts_with("site\n"));

    Ok(())
}

#[test]
fn test_verbose_notes() -> Result<()> {
    let test = basic_site()?;
    let result = run(test.analyze_command().arg("-v"))?;

    assert!(
        result
            .stderr
            .contains("Note: No .hugodepsrc.json found, using default configuration")
    );
    assert!(
        result
            .stderr
            .contains("Note: No Hugo configuration found, analyzing without modules")
    );

    Ok(())
}

// ============================================================
// Modules
// ============================================================

const THEME_SITE_CONFIG: &str = r#"
[module]
replacements = "github.com/acme/theme -> themes"

[[module.imports]]
path = "github.com/acme/theme"
"#;

#[test]
fn test_module_from_replacement() -> Result<()> {
    let test = CliTest::with_files(&[
        ("hugo.toml", THEME_SITE_CONFIG),
        (
            "layouts/index.html",
            "{{ partial \"header.html\" . }}\n{{ partial \"footer.html\" . }}",
        ),
        ("layouts/_partials/header.html", "site header"),
        ("themes/theme/layouts/_partials/header.html", "theme header"),
        ("themes/theme/layouts/_partials/footer.html", "theme footer"),
    ])?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.code, Some(0));
    // The project's own header shadows the theme's.
    assert!(result.stdout.contains("├── includes _partials/header.html (line 1)\n"));
    assert!(result.stdout.contains(
        "└── includes _partials/footer.html [github.com/acme/theme] (line 2)\n"
    ));
    assert!(result.stdout.contains("Modules (1)\n└── github.com/acme/theme@latest\n"));
    assert_eq!(result.stderr, "✓ Analyzed 4 templates - no issues found\n");

    Ok(())
}

#[test]
fn test_module_from_cache_uses_latest_version() -> Result<()> {
    let test = CliTest::with_files(&[
        ("hugo.toml", "[[module.imports]]\npath = \"github.com/acme/theme\"\n"),
        ("layouts/index.html", "{{ partial \"footer.html\" . }}"),
    ])?;
    let base = "hugo-cache/modules/filecache/modules/pkg/mod/github.com/acme";
    test.write_file(&format!("{base}/theme@v1.0.0/layouts/_partials/footer.html"), "old")?;
    test.write_file(&format!("{base}/theme@v1.1.0/layouts/_partials/footer.html"), "new")?;

    let cache_dir = test.root().join("hugo-cache");
    let result = run(test
        .analyze_command()
        .args(["-f", "json", "--cache-dir"])
        .arg(&cache_dir))?;

    assert_eq!(result.code, Some(0));
    let value: Value = serde_json::from_str(&result.stdout)?;
    let footer = value["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["name"] == "_partials/footer.html")
        .unwrap();
    assert!(footer["id"].as_str().unwrap().contains("theme@v1.1.0"));
    assert_eq!(footer["source"], "github.com/acme/theme");

    Ok(())
}

#[test]
fn test_missing_module_is_warning() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "hugo.toml",
            "[[module.imports]]\npath = \"github.com/acme/missing\"\nversion = \"v1.0.0\"\n",
        ),
        ("layouts/index.html", "<html></html>"),
    ])?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.code, Some(0));
    assert!(result.stderr.contains(
        "warning: module github.com/acme/missing@v1.0.0 not found  module-resolution"
    ));
    assert!(result.stderr.contains(&format!("--> {}/hugo.toml", test.root().display())));
    assert!(result.stderr.contains("= hint: run `hugo mod get`"));

    Ok(())
}

#[test]
fn test_no_modules_flag() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "hugo.toml",
            "[[module.imports]]\npath = \"github.com/acme/missing\"\n",
        ),
        ("layouts/index.html", "<html></html>"),
    ])?;
    let result = run(test.analyze_command().arg("--no-modules"))?;

    assert_eq!(result.code, Some(0));
    assert_eq!(result.stderr, "✓ Analyzed 1 template - no issues found\n");

    Ok(())
}

#[test]
fn test_duplicate_import_warns() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "hugo.yaml",
            "module:\n  imports:\n    - path: themes/a\n    - path: themes/a\n",
        ),
        ("themes/a/layouts/_partials/x.html", "x"),
        ("layouts/index.html", "{{ partial \"x.html\" . }}"),
    ])?;
    let result = run(&mut test.analyze_command())?;

    assert_eq!(result.code, Some(0));
    assert!(
        result
            .stderr
            .contains("warning: module 'themes/a' is imported more than once")
    );
    assert!(result.stdout.contains("includes _partials/x.html [themes/a] (line 1)"));

    Ok(())
}
