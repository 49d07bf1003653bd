//! Symbol Registry: canonical names and path lookup over an immutable store.

use crate::error::{Error, Result};
use crate::store::{unit_short_name, DeclId, DeclarationStore, ROOT_UNIT};
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Import chains deeper than this are treated as external paths
const MAX_IMPORT_DEPTH: usize = 16;

/// Outcome of looking up a written type path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Declared(DeclId),
    /// Not declared in the store; carries the fully qualified name after import expansion
    External(String),
}

/// Global symbol table built once per pass
#[derive(Debug)]
pub struct SymbolRegistry<'a> {
    store: &'a DeclarationStore,
    names: Vec<String>,
    by_canonical: BTreeMap<String, DeclId>,
    /// (unit, scope, short name) -> declaration
    by_key: HashMap<(String, Option<String>, String), DeclId>,
    /// short name -> top-level declarations carrying it
    top_level: HashMap<String, Vec<DeclId>>,
}

/// Unit path with `crate::` dropped and separators flattened to `_`
pub fn sanitize_unit(unit: &str) -> String {
    let relative = unit
        .strip_prefix("crate::")
        .unwrap_or(unit);
    relative
        .replace("::", "_")
        .replace(['/', '\\', '.'], "_")
}

impl<'a> SymbolRegistry<'a> {
    /// Assign every declaration its canonical name.
    ///
    /// # Errors
    ///
    /// Returns `NamingConflict` when two declarations end up with the same name, naming
    /// the earlier declaration first.
    pub fn build(store: &'a DeclarationStore) -> Result<Self> {
        let mut groups: HashMap<(Option<&str>, &str), usize> = HashMap::new();
        for (_, decl) in store.types() {
            *groups
                .entry((decl.scope.as_deref(), decl.name.as_str()))
                .or_default() += 1;
        }

        let mut registry = SymbolRegistry {
            store,
            names: Vec::with_capacity(store.len()),
            by_canonical: BTreeMap::new(),
            by_key: HashMap::new(),
            top_level: HashMap::new(),
        };

        for (id, decl) in store.types() {
            let collision = groups
                .get(&(decl.scope.as_deref(), decl.name.as_str()))
                .is_some_and(|count| *count > 1);

            let canonical = match (&decl.name_override, &decl.scope) {
                (Some(name), _) if !name.is_empty() => name.clone(),
                (_, Some(scope)) if collision => {
                    format!("{}.{}.{}", sanitize_unit(&decl.unit), scope, decl.name)
                }
                (_, Some(scope)) => {
                    format!("{}.{}.{}", unit_short_name(&decl.unit), scope, decl.name)
                }
                (_, None) if collision => format!("{}.{}", sanitize_unit(&decl.unit), decl.name),
                (_, None) => decl.name.clone(),
            };

            if let Some(first) = registry.by_canonical.get(&canonical) {
                return Err(Error::NamingConflict {
                    name: canonical,
                    first: store.get(*first).fqn(),
                    second: decl.fqn(),
                });
            }
            debug!("Canonical name for {}: {}", decl.fqn(), canonical);

            registry.by_canonical.insert(canonical.clone(), id);
            registry.names.push(canonical);
            registry
                .by_key
                .insert((decl.unit.clone(), decl.scope.clone(), decl.name.clone()), id);
            if decl.scope.is_none() {
                registry.top_level.entry(decl.name.clone()).or_default().push(id);
            }
        }

        Ok(registry)
    }

    pub fn store(&self) -> &'a DeclarationStore {
        self.store
    }

    pub fn canonical_name(&self, id: DeclId) -> &str {
        &self.names[id.0]
    }

    /// Declaration registered under a canonical name
    pub fn by_canonical(&self, name: &str) -> Option<DeclId> {
        self.by_canonical.get(name).copied()
    }

    /// Canonical names in sorted order
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.by_canonical.keys().map(String::as_str)
    }

    fn find(&self, unit: &str, scope: Option<&str>, name: &str) -> Option<DeclId> {
        self.by_key
            .get(&(unit.to_string(), scope.map(str::to_string), name.to_string()))
            .copied()
    }

    /// Resolve a written type path as seen from `unit` inside `scope`.
    ///
    /// Single names are searched in the routine scope, the unit, its imports, its glob
    /// imports, and finally among globally unique top-level names. Paths that name nothing
    /// in the store come back as [`Lookup::External`].
    pub fn lookup(&self, unit: &str, scope: Option<&str>, path: &[String]) -> Lookup {
        self.lookup_depth(unit, scope, path, 0)
    }

    fn lookup_depth(&self, unit: &str, scope: Option<&str>, path: &[String], depth: usize) -> Lookup {
        let Some(first) = path.first() else {
            return Lookup::External(String::new());
        };
        if depth > MAX_IMPORT_DEPTH {
            return Lookup::External(path.join("::"));
        }

        if path.len() == 1 {
            let name = first.as_str();
            if let Some(routine) = scope {
                if let Some(id) = self.find(unit, Some(routine), name) {
                    return Lookup::Declared(id);
                }
            }
            if let Some(id) = self.find(unit, None, name) {
                return Lookup::Declared(id);
            }
            if let Some(import) = self.store.unit(unit).and_then(|u| u.import(name)) {
                return self.lookup_depth(unit, None, &import.path, depth + 1);
            }
            if let Some(found) = self.lookup_in_globs(unit, name, depth) {
                return found;
            }
            if let Some(ids) = self.top_level.get(name) {
                if ids.len() == 1 {
                    debug!("Resolved {} in {} by unique short name", name, unit);
                    return Lookup::Declared(ids[0]);
                }
            }
            return Lookup::External(name.to_string());
        }

        match self.normalize(unit, path, depth) {
            Some((target_unit, rest)) => self.lookup_in_unit(&target_unit, &rest, depth),
            None => Lookup::External(path.join("::")),
        }
    }

    fn lookup_in_globs(&self, unit: &str, name: &str, depth: usize) -> Option<Lookup> {
        let globs = &self.store.unit(unit)?.globs;
        for glob in globs {
            let Some((target, rest)) = self.normalize(unit, glob, depth) else {
                continue;
            };
            if !rest.is_empty() {
                continue;
            }
            if let Some(id) = self.find(&target, None, name) {
                return Some(Lookup::Declared(id));
            }
        }
        None
    }

    /// Look up the remaining segments relative to a known unit
    fn lookup_in_unit(&self, unit: &str, rest: &[String], depth: usize) -> Lookup {
        match rest {
            [name] => {
                if let Some(id) = self.find(unit, None, name) {
                    return Lookup::Declared(id);
                }
                // re-exports
                if let Some(import) = self.store.unit(unit).and_then(|u| u.import(name)) {
                    return self.lookup_depth(unit, None, &import.path, depth + 1);
                }
                Lookup::External(format!("{}::{}", unit, name))
            }
            _ => Lookup::External(format!("{}::{}", unit, rest.join("::"))),
        }
    }

    /// Turn a multi-segment path into (known unit, remaining segments).
    /// `None` means the path leaves the crate.
    fn normalize(&self, unit: &str, path: &[String], depth: usize) -> Option<(String, Vec<String>)> {
        let first = path.first()?;
        let (mut base, mut index) = match first.as_str() {
            "crate" => (ROOT_UNIT.to_string(), 1),
            "self" => (unit.to_string(), 1),
            "super" => {
                let mut base = unit.to_string();
                let mut index = 0;
                while path.get(index).map(String::as_str) == Some("super") {
                    base = parent_unit(&base)?;
                    index += 1;
                }
                (base, index)
            }
            segment => {
                let child = format!("{}::{}", unit, segment);
                if self.store.has_unit(&child) {
                    (child, 1)
                } else if let Some(import) = self.store.unit(unit).and_then(|u| u.import(segment)) {
                    if depth > MAX_IMPORT_DEPTH {
                        return None;
                    }
                    let mut expanded = import.path.clone();
                    expanded.extend_from_slice(&path[1..]);
                    return self.normalize(unit, &expanded, depth + 1);
                } else {
                    let from_root = format!("{}::{}", ROOT_UNIT, segment);
                    if self.store.has_unit(&from_root) {
                        (from_root, 1)
                    } else {
                        return None;
                    }
                }
            }
        };

        while index < path.len() {
            let child = format!("{}::{}", base, path[index]);
            if !self.store.has_unit(&child) {
                break;
            }
            base = child;
            index += 1;
        }
        Some((base, path[index..].to_vec()))
    }
}

fn parent_unit(unit: &str) -> Option<String> {
    unit.rsplit_once("::").map(|(parent, _)| parent.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TypeDecl;
    use crate::type_expr::TypeExpr;

    fn path(text: &str) -> Vec<String> {
        text.split("::").map(str::to_string).collect()
    }

    fn composite(unit: &str, name: &str) -> TypeDecl {
        TypeDecl::new(unit, name, TypeExpr::Composite(vec![]))
    }

    #[test]
    fn test_sanitize_unit() {
        assert_eq!(sanitize_unit("crate::models::pet"), "models_pet");
        assert_eq!(sanitize_unit("crate"), "crate");
        assert_eq!(sanitize_unit("crate::v1.beta"), "v1_beta");
    }

    #[test]
    fn test_unique_name_stays_short() {
        let mut store = DeclarationStore::new();
        let id = store.add_type(composite("crate::models", "Pet"));
        let registry = SymbolRegistry::build(&store).unwrap();
        assert_eq!(registry.canonical_name(id), "Pet");
    }

    #[test]
    fn test_collision_promotes_every_member() {
        let mut store = DeclarationStore::new();
        let a = store.add_type(composite("crate::a", "Pet"));
        let b = store.add_type(composite("crate::b", "Pet"));
        let c = store.add_type(composite("crate::c::d", "Pet"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(registry.canonical_name(a), "a.Pet");
        assert_eq!(registry.canonical_name(b), "b.Pet");
        assert_eq!(registry.canonical_name(c), "c_d.Pet");
    }

    #[test]
    fn test_locals_are_scope_qualified() {
        let mut store = DeclarationStore::new();
        let top = store.add_type(composite("crate::api", "response"));
        let local = store.add_type(composite("crate::api", "response").in_scope("fun"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(registry.canonical_name(top), "response");
        assert_eq!(registry.canonical_name(local), "api.fun.response");
    }

    #[test]
    fn test_colliding_locals_use_full_unit() {
        let mut store = DeclarationStore::new();
        let a = store.add_type(composite("crate::v1::api", "Body").in_scope("create"));
        let b = store.add_type(composite("crate::v2::api", "Body").in_scope("create"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(registry.canonical_name(a), "v1_api.create.Body");
        assert_eq!(registry.canonical_name(b), "v2_api.create.Body");
    }

    #[test]
    fn test_name_override_wins() {
        let mut store = DeclarationStore::new();
        let a = store.add_type(composite("crate::a", "Pet").with_name_override("Animal"));
        let b = store.add_type(composite("crate::b", "Pet"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(registry.canonical_name(a), "Animal");
        assert_eq!(registry.canonical_name(b), "b.Pet");
        assert_eq!(registry.by_canonical("Animal"), Some(a));
    }

    #[test]
    fn test_identical_names_conflict() {
        let mut store = DeclarationStore::new();
        store.add_type(composite("crate::a", "Pet"));
        store.add_type(composite("crate::b", "Dog").with_name_override("Pet"));

        match SymbolRegistry::build(&store) {
            Err(Error::NamingConflict {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "Pet");
                assert_eq!(first, "crate::a::Pet");
                assert_eq!(second, "crate::b::Dog");
            }
            other => panic!("expected naming conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_local_scope_shadows_unit() {
        let mut store = DeclarationStore::new();
        let top = store.add_type(composite("crate", "response"));
        let local = store.add_type(composite("crate", "response").in_scope("fun"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(
            registry.lookup("crate", Some("fun"), &path("response")),
            Lookup::Declared(local)
        );
        assert_eq!(
            registry.lookup("crate", Some("other"), &path("response")),
            Lookup::Declared(top)
        );
        assert_eq!(
            registry.lookup("crate", None, &path("response")),
            Lookup::Declared(top)
        );
    }

    #[test]
    fn test_lookup_through_imports_and_paths() {
        let mut store = DeclarationStore::new();
        let a = store.add_type(composite("crate::a", "Pet"));
        let b = store.add_type(composite("crate::b", "Pet"));
        store.unit_mut("crate::api");
        store.add_import("crate::api", "Pet", path("crate::b::Pet"));
        store.add_import("crate::api", "DateTime", path("chrono::DateTime"));
        store.add_import("crate::api", "alpha", path("super::a"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(registry.lookup("crate::api", None, &path("Pet")), Lookup::Declared(b));
        assert_eq!(
            registry.lookup("crate::api", None, &path("alpha::Pet")),
            Lookup::Declared(a)
        );
        assert_eq!(
            registry.lookup("crate::api", None, &path("super::a::Pet")),
            Lookup::Declared(a)
        );
        assert_eq!(
            registry.lookup("crate::api", None, &path("crate::b::Pet")),
            Lookup::Declared(b)
        );
        assert_eq!(
            registry.lookup("crate::api", None, &path("DateTime")),
            Lookup::External("chrono::DateTime".to_string())
        );
        assert_eq!(
            registry.lookup("crate::api", None, &path("crate::b::Missing")),
            Lookup::External("crate::b::Missing".to_string())
        );
    }

    #[test]
    fn test_lookup_through_glob_and_unique_fallback() {
        let mut store = DeclarationStore::new();
        let shared = store.add_type(composite("crate::shared", "Money"));
        let lonely = store.add_type(composite("crate::deep::inner", "Lonely"));
        store.add_glob("crate::api", path("crate::shared"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(
            registry.lookup("crate::api", None, &path("Money")),
            Lookup::Declared(shared)
        );
        assert_eq!(
            registry.lookup("crate::api", None, &path("Lonely")),
            Lookup::Declared(lonely)
        );
        assert_eq!(
            registry.lookup("crate::api", None, &path("Nowhere")),
            Lookup::External("Nowhere".to_string())
        );
    }

    #[test]
    fn test_child_module_path() {
        let mut store = DeclarationStore::new();
        let pet = store.add_type(composite("crate::models::pet", "Pet"));
        let registry = SymbolRegistry::build(&store).unwrap();

        assert_eq!(
            registry.lookup("crate", None, &path("models::pet::Pet")),
            Lookup::Declared(pet)
        );
    }
}
