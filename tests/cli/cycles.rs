use anyhow::Result;

use crate::{CliTest, run};

#[test]
fn test_two_partial_cycle() -> Result<()> {
    let test = CliTest::with_files(&[
        ("layouts/_partials/a.html", "{{ partial \"b.html\" . }}"),
        ("layouts/_partials/b.html", "{{ partial \"a.html\" . }}"),
        ("layouts/index.html", "{{ partial \"a.html\" . }}"),
    ])?;
    let result = run(&mut test.cycles_command())?;

    assert_eq!(result.code, Some(1));
    assert_eq!(
        result.stdout,
        "cycle 1: _partials/a.html -> _partials/b.html -> _partials/a.html\n"
    );
    assert!(result.stderr.contains("✘ 1 cycle found\n"));

    Ok(())
}

#[test]
fn test_self_include() -> Result<()> {
    let test = CliTest::with_files(&[(
        "layouts/_partials/tree.html",
        "{{ range .Children }}{{ partial \"tree.html\" . }}{{ end }}",
    )])?;
    let result = run(&mut test.cycles_command())?;

    assert_eq!(result.code, Some(1));
    assert_eq!(
        result.stdout,
        "cycle 1: _partials/tree.html -> _partials/tree.html\n"
    );

    Ok(())
}

#[test]
fn test_no_cycles() -> Result<()> {
    let test = CliTest::with_files(&[
        ("layouts/index.html", "{{ partial \"a.html\" . }}{{ partial \"a.html\" . }}"),
        ("layouts/_partials/a.html", "leaf"),
    ])?;
    let result = run(&mut test.cycles_command())?;

    assert_eq!(result.code, Some(0));
    assert_eq!(result.stdout, "");
    assert!(result.stderr.contains("✓ No cycles found\n"));

    Ok(())
}

#[test]
fn test_cycle_through_template_call() -> Result<()> {
    // `template "card"` resolves to the file defining the block.
    let test = CliTest::with_files(&[
        (
            "layouts/_partials/card.html",
            "{{ define \"card\" }}{{ partial \"badge.html\" . }}{{ end }}",
        ),
        ("layouts/_partials/badge.html", "{{ template \"card\" . }}"),
    ])?;
    let result = run(test.cycles_command().arg("-q"))?;

    assert_eq!(result.code, Some(1));
    assert_eq!(
        result.stdout,
        "cycle 1: _partials/badge.html -> _partials/card.html -> _partials/badge.html\n"
    );
    assert_eq!(result.stderr, "");

    Ok(())
}
