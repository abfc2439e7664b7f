use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, run};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert!(
        parsed.get("ignores").is_some(),
        "Config should have 'ignores' field"
    );
    assert!(
        parsed["templateExtensions"]
            .as_array()
            .is_some_and(|exts| exts.iter().any(|e| e == "html")),
        "Config should list html in 'templateExtensions'"
    );
    assert_eq!(parsed["includeModules"], true);

    // 2-space indentation
    assert!(content.contains("\n  \""));

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;
    let result = run(test.command().arg("init"))?;

    assert_eq!(result.code, Some(0));
    assert_eq!(result.stdout, "✓ Created .hugodepsrc.json\n");
    assert!(test.root().join(".hugodepsrc.json").exists());

    let content = test.read_file(".hugodepsrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".hugodepsrc.json", "{}")?;

    let result = run(test.command().arg("init"))?;

    assert_eq!(result.code, Some(1));
    assert_eq!(result.stderr, "Error: .hugodepsrc.json already exists\n");
    assert_eq!(test.read_file(".hugodepsrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file("layouts/index.html", "{{ partial \"head.html\" . }}")?;
    test.write_file("layouts/_partials/head.html", "<title></title>")?;

    let result = run(&mut test.analyze_command())?;
    assert!(
        result.code == Some(0),
        "Analyze should work with initialized config. stderr: {}",
        result.stderr
    );
    assert_eq!(result.stderr, "✓ Analyzed 2 templates - no issues found\n");

    Ok(())
}
