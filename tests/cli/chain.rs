use anyhow::Result;

use crate::{CliTest, run};

fn site() -> Result<CliTest> {
    CliTest::with_files(&[
        (
            "layouts/index.html",
            "{{ partial \"header.html\" . }}\n{{ partial \"footer.html\" . }}\n{{ partial \"gone.html\" . }}",
        ),
        ("layouts/_partials/header.html", "{{ partial \"logo.html\" . }}"),
        ("layouts/_partials/logo.html", "<svg></svg>"),
        ("layouts/_partials/footer.html", "{{ partial \"logo.html\" . }}"),
    ])
}

#[test]
fn test_chain_from_page() -> Result<()> {
    let test = site()?;
    let result = run(&mut test.chain_command("index.html"))?;

    assert_eq!(
        result.stdout,
        "index.html\n  _partials/header.html\n  _partials/logo.html\n  _partials/footer.html\n  gone.html\n"
    );
    // The unresolved include is still reported.
    assert!(result.stderr.contains("unresolved-dependency"));
    assert_eq!(result.code, Some(0));

    Ok(())
}

#[test]
fn test_chain_by_alias() -> Result<()> {
    let test = site()?;

    for name in ["header.html", "_partials/header.html", "layouts/_partials/header.html"] {
        let result = run(&mut test.chain_command(name))?;
        assert_eq!(
            result.stdout,
            "_partials/header.html\n  _partials/logo.html\n",
            "{name}"
        );
    }

    Ok(())
}

#[test]
fn test_chain_by_absolute_path() -> Result<()> {
    let test = site()?;
    let path = test.root().join("layouts/_partials/footer.html");
    let result = run(&mut test.chain_command(&path.display().to_string()))?;

    assert_eq!(result.stdout, "_partials/footer.html\n  _partials/logo.html\n");

    Ok(())
}

#[test]
fn test_unknown_template() -> Result<()> {
    let test = site()?;
    let result = run(&mut test.chain_command("nope.html"))?;

    assert_eq!(result.code, Some(1));
    assert_eq!(result.stdout, "");
    assert!(
        result
            .stderr
            .starts_with("error: no template matches \"nope.html\"\n")
    );

    Ok(())
}
