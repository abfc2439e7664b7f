//! Name tables used to resolve template references.
//!
//! Hugo lets a partial be referenced by several spellings: `_partials/nav.html`,
//! `partials/nav.html`, `nav.html`. [`build_lookup`] registers every spelling a
//! template can be reached by, and [`TemplateLookup`] adds the table of
//! `define` blocks used by `template` calls.

use std::collections::HashMap;

use crate::core::template::{Dependency, DependencyKind, Template};

/// First segments under which a template is also reachable by shorter names.
pub const SHORT_NAME_ROOTS: &[&str] = &["_partials", "partials", "_components", "components"];

/// Every alias a template can be referenced by, most specific first.
///
/// - the path below the templates root
/// - the same path with a leading `_` stripped from its first segment
/// - for partial or component roots: the bare file name and the path below
///   that root
pub fn template_aliases(template: &Template) -> Vec<String> {
    let Some(segments) = template.root_relative_segments() else {
        return Vec::new();
    };
    let Some(first) = segments.first() else {
        return Vec::new();
    };

    let mut aliases = vec![segments.join("/")];

    if let Some(stripped) = first.strip_prefix('_') {
        let rest = &segments[1..];
        let alias = if rest.is_empty() {
            stripped.to_string()
        } else {
            format!("{}/{}", stripped, rest.join("/"))
        };
        aliases.push(alias);
    }

    if SHORT_NAME_ROOTS.contains(&first.as_str()) && segments.len() > 1 {
        if let Some(file_name) = segments.last() {
            aliases.push(file_name.clone());
        }
        aliases.push(segments[1..].join("/"));
    }

    let mut unique = Vec::with_capacity(aliases.len());
    for alias in aliases {
        if !unique.contains(&alias) {
            unique.push(alias);
        }
    }
    unique
}

/// Map every alias to its template. The first template to claim an alias keeps it.
pub fn build_lookup<'a>(
    templates: impl IntoIterator<Item = &'a Template>,
) -> HashMap<String, &'a Template> {
    let mut lookup = HashMap::new();
    for template in templates {
        for alias in template_aliases(template) {
            lookup.entry(alias).or_insert(template);
        }
    }
    lookup
}

/// Map every `define` block name to the template that defines it.
pub fn build_block_lookup<'a>(
    templates: impl IntoIterator<Item = &'a Template>,
) -> HashMap<String, &'a Template> {
    let mut lookup = HashMap::new();
    for template in templates {
        for definition in template.dependencies_of_kind(DependencyKind::BlockDefinition) {
            lookup.entry(definition.target.clone()).or_insert(template);
        }
    }
    lookup
}

/// Alias and block tables over one set of templates.
#[derive(Debug, Default)]
pub struct TemplateLookup<'a> {
    aliases: HashMap<String, &'a Template>,
    blocks: HashMap<String, &'a Template>,
}

impl<'a> TemplateLookup<'a> {
    pub fn build(templates: &'a [Template]) -> Self {
        Self {
            aliases: build_lookup(templates),
            blocks: build_block_lookup(templates),
        }
    }

    pub fn get(&self, alias: &str) -> Option<&'a Template> {
        self.aliases.get(alias).copied()
    }

    pub fn block(&self, name: &str) -> Option<&'a Template> {
        self.blocks.get(name).copied()
    }

    /// Resolve an include-like dependency to its target template.
    ///
    /// `template "name"` calls first look for a template defining block `name`,
    /// then fall back to the alias table like the other include kinds.
    pub fn resolve(&self, dependency: &Dependency) -> Option<&'a Template> {
        if !dependency.kind.is_include_like() {
            return None;
        }
        if dependency.kind == DependencyKind::CrossTemplateCall
            && let Some(definer) = self.block(&dependency.target)
        {
            return Some(definer);
        }
        self.get(&dependency.target)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::template::TemplateSource;

    fn template(path: &str) -> Template {
        Template::new(path, TemplateSource::Local)
    }

    fn dependency(kind: DependencyKind, target: &str) -> Dependency {
        Dependency {
            kind,
            target: target.to_string(),
            line: 1,
            context: String::new(),
            is_conditional: false,
            parameters: None,
        }
    }

    #[test]
    fn test_partial_aliases() {
        let aliases = template_aliases(&template("/site/layouts/_partials/nav/menu.html"));
        assert_eq!(
            aliases,
            vec![
                "_partials/nav/menu.html",
                "partials/nav/menu.html",
                "menu.html",
                "nav/menu.html",
            ]
        );
    }

    #[test]
    fn test_legacy_partials_dir_aliases() {
        let aliases = template_aliases(&template("/site/layouts/partials/header.html"));
        assert_eq!(aliases, vec!["partials/header.html", "header.html"]);
    }

    #[test]
    fn test_component_aliases() {
        let aliases = template_aliases(&template("/site/layouts/components/card.html"));
        assert_eq!(aliases, vec!["components/card.html", "card.html"]);
    }

    #[test]
    fn test_regular_template_aliases() {
        assert_eq!(
            template_aliases(&template("/site/layouts/_default/single.html")),
            vec!["_default/single.html", "default/single.html"]
        );
        assert_eq!(
            template_aliases(&template("/site/layouts/index.html")),
            vec!["index.html"]
        );
    }

    #[test]
    fn test_template_outside_layouts_has_no_aliases() {
        assert!(template_aliases(&template("/site/static/x.html")).is_empty());
    }

    #[test]
    fn test_first_registration_wins() {
        let templates = vec![
            template("/site/layouts/_partials/header.html"),
            template("/theme/layouts/partials/header.html"),
        ];
        let lookup = build_lookup(&templates);

        assert_eq!(lookup["header.html"].file_path, templates[0].file_path);
        assert_eq!(
            lookup["partials/header.html"].file_path,
            templates[0].file_path
        );
    }

    #[test]
    fn test_block_lookup() {
        let mut baseof = template("/site/layouts/baseof.html");
        baseof.dependencies = vec![dependency(DependencyKind::BlockDefinition, "main")];
        let templates = vec![baseof];

        let lookup = TemplateLookup::build(&templates);
        assert_eq!(
            lookup.block("main").map(|t| t.display_name()),
            Some("baseof.html".to_string())
        );
        assert!(lookup.block("footer").is_none());
    }

    #[test]
    fn test_resolve_template_call_prefers_block_definition() {
        let mut definer = template("/site/layouts/_default/baseof.html");
        definer.dependencies = vec![dependency(DependencyKind::BlockDefinition, "footer.html")];
        let templates = vec![template("/site/layouts/footer.html"), definer];
        let lookup = TemplateLookup::build(&templates);

        let call = dependency(DependencyKind::CrossTemplateCall, "footer.html");
        assert_eq!(
            lookup.resolve(&call).map(|t| t.file_path.clone()),
            Some(templates[1].file_path.clone())
        );

        let partial = dependency(DependencyKind::DirectInclude, "footer.html");
        assert_eq!(
            lookup.resolve(&partial).map(|t| t.file_path.clone()),
            Some(templates[0].file_path.clone())
        );
    }

    #[test]
    fn test_resolve_ignores_non_include_kinds() {
        let templates = vec![template("/site/layouts/_partials/x.html")];
        let lookup = TemplateLookup::build(&templates);
        assert!(lookup.resolve(&dependency(DependencyKind::BlockUsage, "x.html")).is_none());
        assert!(lookup.resolve(&dependency(DependencyKind::DirectInclude, "x.html")).is_some());
    }
}
