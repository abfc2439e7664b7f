use std::{
    cell::OnceCell,
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use rayon::prelude::*;

use crate::{
    config::{CONFIG_FILE_NAME, Config, load_config},
    core::{
        file_scanner::{IgnoreRules, ScanResult, scan_templates},
        graph::DependencyGraph,
        lookup::TemplateLookup,
        modules::{Module, ModuleResolver, Replacements},
        parsers::parse_template,
        site_config::{HUGO_CONFIG_TIMEOUT, SiteConfig, load_from_hugo, load_site_config},
        template::{Dependency, DependencyKind, Template, TemplateSource},
    },
    issues::{
        FileAccessIssue, Issue, ModuleResolutionIssue, ParseErrorIssue, Severity, SourceContext,
        UnresolvedDependencyIssue,
    },
};

/// Settings for one analysis run, usually built from command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Project root; the current directory when `None`.
    pub project_root: Option<PathBuf>,
    /// Overrides `includeModules` from the config file.
    pub include_modules: Option<bool>,
    /// Added to the config file's `ignores`.
    pub ignores: Vec<String>,
    /// Overrides every other cache root source.
    pub cache_dir: Option<PathBuf>,
    /// Read the site configuration through `hugo config`.
    pub use_hugo: bool,
    pub verbose: bool,
}

/// Everything one run produced.
#[derive(Debug, Default)]
pub struct Analysis {
    /// Parsed templates in registration order: local first, then modules in
    /// import order, each sorted by path.
    pub templates: Vec<Template>,
    pub modules: Vec<Module>,
    pub graph: DependencyGraph,
    pub issues: Vec<Issue>,
    /// Problems with the site configuration's module imports.
    pub config_warnings: Vec<String>,
}

impl Analysis {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity() == severity)
            .count()
    }

    /// Find a template by node id, by any alias, or by a path relative to
    /// `project_root`.
    pub fn find_template(&self, name: &str, project_root: &Path) -> Option<&Template> {
        if let Some(found) = self.templates.iter().find(|t| t.node_id() == name) {
            return Some(found);
        }
        let alias = name.trim_start_matches("layouts/");
        if let Some(found) = TemplateLookup::build(&self.templates).get(alias) {
            return Some(found);
        }
        let candidate = project_root.join(name).canonicalize().ok()?;
        self.templates.iter().find(|t| t.file_path == candidate)
    }
}

/// Core analysis context orchestrating the pipeline.
///
/// 1. **Configuration**: tool config, site config, cache root
/// 2. **Discovery**: local templates, then resolved module templates
/// 3. **Extraction**: read, strip and extract each file in parallel
/// 4. **Graph**: single-threaded insertion in registration order
///
/// Configuration is loaded eagerly so a broken config fails fast; the rest
/// runs on first call to [`analysis`](Self::analysis).
pub struct AnalysisContext {
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,

    /// Canonical project root.
    pub project_root: PathBuf,

    pub site_config: SiteConfig,

    /// Where the site configuration came from, if anywhere.
    pub site_config_path: Option<PathBuf>,

    pub cache_root: Option<PathBuf>,

    pub verbose: bool,

    analysis: OnceCell<Analysis>,
}

impl AnalysisContext {
    /// Load configuration for a run.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the project root does not exist
    /// - the tool config file is invalid
    /// - the site configuration cannot be read or parsed
    pub fn new(options: AnalysisOptions) -> Result<Self> {
        let verbose = options.verbose;

        let root = options.project_root.unwrap_or_else(|| PathBuf::from("."));
        let project_root = root
            .canonicalize()
            .with_context(|| format!("Project path does not exist: {}", root.display()))?;

        // ============================================================
        // 1. Tool config (CLI > config file > defaults)
        // ============================================================
        let config_result = load_config(&project_root)?;
        if verbose && !config_result.from_file() {
            eprintln!(
                "Note: No {} found, using default configuration",
                CONFIG_FILE_NAME
            );
        }

        let mut config = config_result.config;
        if let Some(include_modules) = options.include_modules {
            config.include_modules = include_modules;
        }
        config.ignores.extend(options.ignores);
        config.validate()?;

        // ============================================================
        // 2. Site config
        // ============================================================
        let site = if options.use_hugo {
            load_from_hugo(&project_root, HUGO_CONFIG_TIMEOUT)
        } else {
            load_site_config(&project_root)
        }
        .context("Failed to load Hugo site configuration")?;

        if verbose {
            match &site.source {
                Some(path) => eprintln!("Note: Using Hugo configuration from {}", path.display()),
                None => eprintln!("Note: No Hugo configuration found, analyzing without modules"),
            }
        }

        // ============================================================
        // 3. Cache root (CLI > config file > site config > env > platform)
        // ============================================================
        let cache_root = options
            .cache_dir
            .or_else(|| {
                config
                    .cache_dir
                    .as_deref()
                    .map(|dir| PathBuf::from(shellexpand::tilde(dir).as_ref()))
            })
            .or_else(|| site.config.cache_root());

        tracing::debug!(
            root = %project_root.display(),
            cache = ?cache_root,
            include_modules = config.include_modules,
            "analysis configured"
        );

        Ok(Self {
            config,
            project_root,
            site_config: site.config,
            site_config_path: site.source,
            cache_root,
            verbose,
            analysis: OnceCell::new(),
        })
    }

    /// Run the pipeline (lazy initialization).
    pub fn analysis(&self) -> &Analysis {
        self.analysis.get_or_init(|| self.run())
    }

    pub fn into_analysis(self) -> Analysis {
        let _ = self.analysis();
        self.analysis.into_inner().unwrap_or_default()
    }

    fn run(&self) -> Analysis {
        let mut issues = Vec::new();
        let extensions = self.config.normalized_extensions();
        let ignores = IgnoreRules::new(&self.project_root, &self.config.ignores);

        // ============================================================
        // Discovery
        // ============================================================
        let local = scan_templates(&self.project_root, &extensions, &ignores);
        let mut sources = self.collect_sources(local, TemplateSource::Local, &mut issues);

        let (modules, config_warnings) = if self.config.include_modules {
            self.resolve_modules(&mut issues)
        } else {
            (Vec::new(), Vec::new())
        };

        for module in &modules {
            let scan = scan_templates(&module.resolved_path, &extensions, &ignores);
            let source = TemplateSource::Module(module.path.clone());
            sources.extend(self.collect_sources(scan, source, &mut issues));
        }

        // A replacement can point back into the project; keep the first claim.
        let mut seen = HashSet::new();
        sources.retain(|file| seen.insert(file.path.clone()));

        // ============================================================
        // Extraction (parallel, order preserved)
        // ============================================================
        let loaded: Vec<Result<Template, Issue>> = sources
            .into_par_iter()
            .map(load_template)
            .collect();

        let mut templates = Vec::with_capacity(loaded.len());
        for result in loaded {
            match result {
                Ok(template) => templates.push(template),
                Err(issue) => {
                    if self.verbose {
                        eprintln!("Note: Skipped {}", issue_path(&issue));
                    }
                    issues.push(issue);
                }
            }
        }

        // ============================================================
        // Graph
        // ============================================================
        let (graph, unresolved) = build_graph(&templates, &modules);
        issues.extend(unresolved);

        tracing::debug!(
            templates = templates.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            issues = issues.len(),
            "analysis finished"
        );

        Analysis {
            templates,
            modules,
            graph,
            issues,
            config_warnings,
        }
    }

    fn collect_sources(
        &self,
        scan: ScanResult,
        source: TemplateSource,
        issues: &mut Vec<Issue>,
    ) -> Vec<SourceFile> {
        for skipped in scan.skipped {
            let file_path = skipped
                .path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| self.project_root.display().to_string());
            issues.push(Issue::FileAccess(FileAccessIssue {
                file_path,
                error: skipped.error,
            }));
        }
        let root = scan.root;
        scan.files
            .into_iter()
            .map(|path| SourceFile {
                path,
                root: root.clone(),
                source: source.clone(),
            })
            .collect()
    }

    /// Resolve every configured import; failures become issues.
    ///
    /// Imports resolve concurrently; each import's own resolution chain is
    /// sequential.
    fn resolve_modules(&self, issues: &mut Vec<Issue>) -> (Vec<Module>, Vec<String>) {
        let config_warnings = self.site_config.validate_imports();
        for warning in &config_warnings {
            tracing::warn!("{}", warning);
        }

        let replacements: Replacements = self.site_config.replacements();
        if !replacements.is_empty() {
            tracing::debug!(count = replacements.len(), "module replacements configured");
        }
        let resolver = ModuleResolver::new(
            &self.project_root,
            self.cache_root.as_deref(),
            &replacements,
        );

        let mut seen = HashSet::new();
        let imports: Vec<(&str, Option<&str>)> = self
            .site_config
            .module_imports()
            .filter(|(path, _)| seen.insert(*path))
            .collect();

        let resolved: Vec<(String, Option<String>, Option<PathBuf>)> = imports
            .par_iter()
            .map(|&(path, version)| {
                (
                    path.to_string(),
                    version.map(str::to_string),
                    resolver.resolve(path, version),
                )
            })
            .collect();

        let mut modules = Vec::new();
        for (path, version, found) in resolved {
            match found {
                Some(resolved_path) => {
                    if self.verbose {
                        eprintln!("Note: Module {} -> {}", path, resolved_path.display());
                    }
                    modules.push(Module {
                        path,
                        version,
                        resolved_path,
                    });
                }
                None => issues.push(Issue::ModuleResolution(ModuleResolutionIssue {
                    module_path: path,
                    version,
                    config_path: self
                        .site_config_path
                        .as_ref()
                        .map(|p| p.display().to_string()),
                })),
            }
        }

        (modules, config_warnings)
    }
}

/// A discovered file waiting to be read.
struct SourceFile {
    path: PathBuf,
    /// The `layouts` directory it was found under.
    root: PathBuf,
    source: TemplateSource,
}

/// Read one file and extract its dependencies.
fn load_template(file: SourceFile) -> Result<Template, Issue> {
    let mut template = Template::in_root(file.root, file.path, file.source);
    match fs::read_to_string(&template.file_path) {
        Ok(content) => {
            template.dependencies = parse_template(&content);
            template.content = Some(content);
            Ok(template)
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            Err(Issue::ParseError(ParseErrorIssue {
                file_path: template.node_id(),
                error: "file is not valid UTF-8".to_string(),
            }))
        }
        Err(e) => Err(Issue::FileAccess(FileAccessIssue {
            file_path: template.node_id(),
            error: e.to_string(),
        })),
    }
}

/// Insert all templates and their dependencies into a fresh graph.
///
/// Returns the graph plus one issue per unresolved include-like dependency.
pub fn build_graph(templates: &[Template], modules: &[Module]) -> (DependencyGraph, Vec<Issue>) {
    let lookup = TemplateLookup::build(templates);
    let mut graph = DependencyGraph::new();
    let mut issues = Vec::new();

    for module in modules {
        graph.add_module(module);
    }
    for template in templates {
        graph.add_template(template);
    }

    for template in templates {
        for dependency in &template.dependencies {
            if dependency.kind == DependencyKind::CrossTemplateCall
                && template.defines_block(&dependency.target)
            {
                graph.add_local_block_call(template, dependency);
            } else if dependency.kind.is_include_like() {
                let target = lookup.resolve(dependency);
                if target.is_none() {
                    issues.push(unresolved_issue(template, dependency));
                }
                graph.add_include_dependency(template, target, dependency);
            } else if dependency.kind.is_block() {
                graph.add_block_dependency(template, dependency);
            }
        }
    }

    (graph, issues)
}

fn unresolved_issue(template: &Template, dependency: &Dependency) -> Issue {
    let source_line = template.source_line(dependency.line).unwrap_or_default();
    let col = source_line
        .find(&format!("\"{}\"", dependency.target))
        .map(|byte| source_line[..byte].chars().count() + 2)
        .unwrap_or(1);

    Issue::UnresolvedDependency(UnresolvedDependencyIssue {
        context: SourceContext::new(template.node_id(), dependency.line, col, source_line),
        target: dependency.target.clone(),
        kind: dependency.kind,
    })
}

fn issue_path(issue: &Issue) -> String {
    use crate::issues::{Report, ReportLocation};

    match issue.location() {
        ReportLocation::Source(ctx) => ctx.file_path().to_string(),
        ReportLocation::File { path } | ReportLocation::Module { path } => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::core::graph::Relationship;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    fn analyze(root: &Path) -> Analysis {
        AnalysisContext::new(AnalysisOptions {
            project_root: Some(root.to_path_buf()),
            ..AnalysisOptions::default()
        })
        .unwrap()
        .into_analysis()
    }

    #[test]
    fn test_local_project() {
        let dir = project();
        write(
            dir.path(),
            "layouts/index.html",
            "{{ partial \"header.html\" . }}\n{{ if .Params.show }}\n{{ partial \"sidebar.html\" . }}\n{{ end }}",
        );
        write(dir.path(), "layouts/_partials/header.html", "<header></header>");
        write(dir.path(), "layouts/_partials/sidebar.html", "<aside></aside>");

        let analysis = analyze(dir.path());

        assert_eq!(analysis.templates.len(), 3);
        assert_eq!(analysis.graph.node_count(), 3);
        assert_eq!(analysis.graph.edge_count_by(Relationship::Includes), 2);
        assert!(analysis.issues.is_empty());
        assert!(analysis.graph.detect_cycles().is_empty());
    }

    #[test]
    fn test_unresolved_dependency_is_warning_with_placeholder() {
        let dir = project();
        write(dir.path(), "layouts/index.html", "<div>\n  {{ partial \"gone.html\" . }}\n</div>");

        let analysis = analyze(dir.path());

        assert_eq!(analysis.warning_count(), 1);
        assert_eq!(analysis.error_count(), 0);
        assert!(analysis.graph.node("gone.html").unwrap().is_placeholder());

        let Issue::UnresolvedDependency(issue) = &analysis.issues[0] else {
            panic!("expected unresolved dependency");
        };
        assert_eq!(issue.context.line(), 2);
        assert_eq!(issue.context.col(), 15);
        assert_eq!(issue.context.source_line, "  {{ partial \"gone.html\" . }}");
    }

    #[test]
    fn test_edge_count_matches_dependencies() {
        let dir = project();
        write(
            dir.path(),
            "layouts/baseof.html",
            r#"{{ partial "a.html" . }}{{ partial "a.html" . }}{{ template "missing" . }}{{ block "main" . }}{{ end }}"#,
        );
        write(
            dir.path(),
            "layouts/_default/single.html",
            r#"{{ define "main" }}{{ include "a.html" . }}{{ end }}"#,
        );
        write(dir.path(), "layouts/_partials/a.html", "a");

        let analysis = analyze(dir.path());
        let include_like: usize = analysis
            .templates
            .iter()
            .flat_map(|t| &t.dependencies)
            .filter(|d| d.kind.is_include_like())
            .count();
        let block: usize = analysis
            .templates
            .iter()
            .flat_map(|t| &t.dependencies)
            .filter(|d| d.kind.is_block())
            .count();

        assert_eq!(include_like, 4);
        assert_eq!(analysis.graph.edge_count_by(Relationship::Includes), include_like);
        assert_eq!(analysis.graph.edge_count(), include_like + block);
        assert!(analysis.graph.contains("block:main"));
    }

    #[test]
    fn test_template_call_resolves_to_block_definer() {
        let dir = project();
        write(dir.path(), "layouts/index.html", r#"{{ template "card" . }}"#);
        write(
            dir.path(),
            "layouts/_partials/cards.html",
            r#"{{ define "card" }}<div></div>{{ end }}"#,
        );

        let analysis = analyze(dir.path());
        let index = analysis.find_template("index.html", dir.path()).unwrap();
        let edges = analysis.graph.outgoing(&index.node_id());

        assert_eq!(edges.len(), 1);
        assert!(edges[0].target.id.ends_with("cards.html"));
        assert_eq!(edges[0].edge.dependency_kind, DependencyKind::CrossTemplateCall);
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_template_call_to_own_define_is_not_a_cycle() {
        let dir = project();
        write(
            dir.path(),
            "layouts/_partials/card.html",
            r#"{{ define "card-body" }}<p></p>{{ end }}{{ template "card-body" . }}"#,
        );

        let analysis = analyze(dir.path());
        let card = analysis.find_template("card.html", dir.path()).unwrap();
        let edges = analysis.graph.outgoing(&card.node_id());

        assert!(analysis.graph.detect_cycles().is_empty());
        assert_eq!(analysis.graph.edge_count_by(Relationship::Includes), 0);
        assert_eq!(
            edges
                .iter()
                .map(|e| (e.edge.relationship, e.target.id.as_str()))
                .collect::<Vec<_>>(),
            vec![
                (Relationship::Defines, "block:card-body"),
                (Relationship::Uses, "block:card-body"),
            ]
        );
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_project_below_a_layouts_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("layouts/site");
        fs::create_dir_all(root.join(".git")).unwrap();
        write(&root, "layouts/index.html", r#"{{ partial "header.html" . }}"#);
        write(&root, "layouts/_partials/header.html", "<header></header>");

        let analysis = analyze(&root);
        let names: Vec<String> = analysis
            .templates
            .iter()
            .map(|t| t.display_name())
            .collect();

        assert_eq!(names, vec!["_partials/header.html", "index.html"]);
        assert!(analysis.issues.is_empty());
        assert_eq!(analysis.graph.placeholders().count(), 0);
        assert_eq!(analysis.graph.edge_count_by(Relationship::Includes), 1);
    }

    #[test]
    fn test_cycle_through_partials() {
        let dir = project();
        write(dir.path(), "layouts/_partials/a.html", r#"{{ partial "b.html" . }}"#);
        write(dir.path(), "layouts/_partials/b.html", r#"{{ partial "a.html" . }}"#);

        let analysis = analyze(dir.path());
        let cycles = analysis.graph.detect_cycles();

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 2);
    }

    #[test]
    fn test_module_templates_are_tagged_and_shadowed() {
        let dir = project();
        write(
            dir.path(),
            "hugo.toml",
            "[module]\nreplacements = \"github.com/acme/theme -> themes\"\n[[module.imports]]\npath = \"github.com/acme/theme\"\n",
        );
        write(dir.path(), "themes/theme/layouts/_partials/header.html", "theme header");
        write(dir.path(), "themes/theme/layouts/_partials/footer.html", "theme footer");
        write(dir.path(), "layouts/_partials/header.html", "site header");
        write(
            dir.path(),
            "layouts/index.html",
            r#"{{ partial "header.html" . }}{{ partial "footer.html" . }}"#,
        );

        let analysis = analyze(dir.path());

        assert_eq!(analysis.modules.len(), 1);
        assert!(analysis.graph.contains("module:github.com/acme/theme"));

        let index = analysis.find_template("index.html", dir.path()).unwrap();
        let targets: Vec<_> = analysis
            .graph
            .outgoing(&index.node_id())
            .iter()
            .map(|e| (e.target.id.clone(), e.target.source().cloned()))
            .collect();

        assert!(targets[0].0.contains("/layouts/_partials/header.html"));
        assert!(!targets[0].0.contains("themes"));
        assert_eq!(targets[0].1, Some(TemplateSource::Local));
        assert_eq!(
            targets[1].1,
            Some(TemplateSource::Module("github.com/acme/theme".to_string()))
        );
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_missing_module_is_warning() {
        let dir = project();
        let cache = TempDir::new().unwrap();
        write(
            dir.path(),
            "hugo.toml",
            "[[module.imports]]\npath = \"github.com/acme/missing\"\nversion = \"v1.0.0\"\n",
        );
        write(dir.path(), "layouts/index.html", "plain");

        let analysis = AnalysisContext::new(AnalysisOptions {
            project_root: Some(dir.path().to_path_buf()),
            cache_dir: Some(cache.path().to_path_buf()),
            ..AnalysisOptions::default()
        })
        .unwrap()
        .into_analysis();

        assert_eq!(analysis.modules.len(), 0);
        assert_eq!(analysis.warning_count(), 1);
        assert_eq!(analysis.issues[0].rule(), crate::issues::Rule::ModuleResolution);
    }

    #[test]
    fn test_modules_disabled() {
        let dir = project();
        write(
            dir.path(),
            "hugo.toml",
            "[[module.imports]]\npath = \"github.com/acme/missing\"\n",
        );

        let analysis = AnalysisContext::new(AnalysisOptions {
            project_root: Some(dir.path().to_path_buf()),
            include_modules: Some(false),
            ..AnalysisOptions::default()
        })
        .unwrap()
        .into_analysis();

        assert!(analysis.issues.is_empty());
        assert!(analysis.config_warnings.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_parse_warning() {
        let dir = project();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::write(dir.path().join("layouts/bad.html"), [0xff, 0xfe, 0x00]).unwrap();
        write(dir.path(), "layouts/good.html", "ok");

        let analysis = analyze(dir.path());

        assert_eq!(analysis.templates.len(), 1);
        assert_eq!(analysis.warning_count(), 1);
        assert_eq!(analysis.issues[0].rule(), crate::issues::Rule::ParseError);
    }

    #[test]
    fn test_broken_site_config_is_fatal() {
        let dir = project();
        write(dir.path(), "hugo.toml", "[module\n");

        let err = AnalysisContext::new(AnalysisOptions {
            project_root: Some(dir.path().to_path_buf()),
            ..AnalysisOptions::default()
        })
        .err()
        .unwrap();

        assert!(format!("{:#}", err).contains("hugo.toml"));
    }

    #[test]
    fn test_missing_project_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = AnalysisContext::new(AnalysisOptions {
            project_root: Some(dir.path().join("nope")),
            ..AnalysisOptions::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_find_template_by_alias_and_path() {
        let dir = project();
        write(dir.path(), "layouts/_partials/nav/menu.html", "menu");

        let analysis = analyze(dir.path());

        for name in [
            "menu.html",
            "nav/menu.html",
            "_partials/nav/menu.html",
            "layouts/_partials/nav/menu.html",
        ] {
            assert!(analysis.find_template(name, dir.path()).is_some(), "{name}");
        }
        assert!(analysis.find_template("other.html", dir.path()).is_none());
    }
}
