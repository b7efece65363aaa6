//! File-level name visibility used when spelling types at a location.

use nova_types::{ClassId, TypeEnv};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDecl {
    /// `import java.util.List;` (nested types use their source name, `java.util.Map.Entry`).
    TypeSingle { ty: String },
    /// `import java.util.*;`
    TypeStar { package: String },
}

/// The package and imports of a compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScope {
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
}

impl ImportScope {
    pub fn new(package: Option<&str>) -> Self {
        Self {
            package: package.map(str::to_string),
            imports: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_import(mut self, import: ImportDecl) -> Self {
        self.imports.push(import);
        self
    }

    /// The shortest spelling of class `id` (binary name `binary_name`) that denotes the same
    /// class in this scope. Falls back to the fully qualified source name.
    ///
    /// Only names that are already visible are used; no import is implied.
    #[must_use]
    pub fn shortest_class_name(&self, env: &dyn TypeEnv, id: ClassId, binary_name: &str) -> String {
        let source_name = binary_name.replace('$', ".");

        // `import java.util.Map.Entry;` makes `Entry` visible directly.
        if binary_name.contains('$') && self.imports_single(&source_name) {
            let simple = simple_name(&source_name);
            if !self.single_import_conflicts(simple, &source_name) {
                return simple.to_string();
            }
        }

        let (top_level, nested) = match binary_name.split_once('$') {
            Some((top, rest)) => (top, Some(rest.replace('$', "."))),
            None => (binary_name, None),
        };
        let top_level_id = if nested.is_some() {
            env.lookup_class(top_level)
        } else {
            Some(id)
        };

        let Some(top_level_id) = top_level_id else {
            return source_name;
        };
        if !self.is_visible_by_simple_name(env, top_level_id, top_level) {
            return source_name;
        }

        let simple = simple_name(top_level);
        match nested {
            Some(nested) => format!("{simple}.{nested}"),
            None => simple.to_string(),
        }
    }

    fn imports_single(&self, fqn: &str) -> bool {
        self.imports
            .iter()
            .any(|import| matches!(import, ImportDecl::TypeSingle { ty } if ty == fqn))
    }

    fn single_import_conflicts(&self, simple: &str, fqn: &str) -> bool {
        self.imports.iter().any(|import| match import {
            ImportDecl::TypeSingle { ty } => ty != fqn && simple_name(ty) == simple,
            ImportDecl::TypeStar { .. } => false,
        })
    }

    /// Whether the simple name of top-level class `fqn` resolves to `id` here.
    fn is_visible_by_simple_name(&self, env: &dyn TypeEnv, id: ClassId, fqn: &str) -> bool {
        let simple = simple_name(fqn);
        let package = package_of(fqn);

        if self.single_import_conflicts(simple, fqn) {
            return false;
        }
        if self.imports_single(fqn) {
            return true;
        }

        // Same-package classes shadow on-demand and implicit imports.
        let own_package = self.package.as_deref().unwrap_or("");
        if package == own_package {
            return true;
        }
        let shadowed_by_own_package = env
            .lookup_class(&qualify(own_package, simple))
            .is_some_and(|other| other != id);
        if shadowed_by_own_package {
            return false;
        }

        let mut on_demand_matches = 0;
        let mut visible = false;
        let star_packages = self.imports.iter().filter_map(|import| match import {
            ImportDecl::TypeStar { package } => Some(package.as_str()),
            ImportDecl::TypeSingle { .. } => None,
        });
        for star in star_packages.chain(std::iter::once("java.lang")) {
            let Some(found) = env.lookup_class(&qualify(star, simple)) else {
                continue;
            };
            on_demand_matches += usize::from(found != id);
            visible |= found == id;
        }
        // Ambiguous on-demand imports make the simple name unusable.
        visible && on_demand_matches == 0
    }
}

fn simple_name(fqn: &str) -> &str {
    fqn.rsplit('.').next().unwrap_or(fqn)
}

fn package_of(fqn: &str) -> &str {
    fqn.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

fn qualify(package: &str, simple: &str) -> String {
    if package.is_empty() {
        simple.to_string()
    } else {
        format!("{package}.{simple}")
    }
}
