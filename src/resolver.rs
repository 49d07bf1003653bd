//! Schema Resolver: turns type expressions into schemas and collects named definitions.
//!
//! Named composites, enums and named collections become entries of the definitions map
//! and are referenced by `$ref`. A definition's slot is allocated before its body is
//! resolved, so reaching it again while its fields are still being resolved yields a
//! reference instead of recursing forever.

use crate::enums;
use crate::error::{Error, Result};
use crate::naming::NamingStrategy;
use crate::overrides::{Override, OverrideTable};
use crate::registry::{Lookup, SymbolRegistry};
use crate::schema::{AdditionalProperties, Schema, SchemaKind};
use crate::store::{DeclId, DeclarationStore, Disposition, Field, TypeDecl, ROOT_UNIT};
use crate::type_expr::TypeExpr;
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

/// Knobs of one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassConfig {
    /// Applied to fields with neither an explicit rename nor a container `rename_all`
    pub strategy: NamingStrategy,
    /// Every non-optional field is required
    pub required_by_default: bool,
}

/// Result of resolving one type expression
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Schema(Schema),
    /// The type is elided by an override; the property must be dropped
    Elided,
}

/// A generic argument together with the place it was written
#[derive(Debug, Clone)]
struct Binding {
    expr: TypeExpr,
    env: Env,
}

/// Where a type expression was written: unit, routine scope and generic bindings
#[derive(Debug, Clone)]
pub struct Env {
    unit: String,
    scope: Option<String>,
    bindings: Rc<HashMap<String, Binding>>,
}

impl Env {
    pub fn at(unit: &str, scope: Option<&str>) -> Self {
        Env {
            unit: unit.to_string(),
            scope: scope.map(str::to_string),
            bindings: Rc::new(HashMap::new()),
        }
    }

    /// The crate root, used for override replacements
    pub fn root() -> Self {
        Env::at(ROOT_UNIT, None)
    }

    fn binding(&self, path: &[String]) -> Option<&Binding> {
        match path {
            [name] => self.bindings.get(name),
            _ => None,
        }
    }
}

/// One property candidate while assembling an object
#[derive(Debug)]
struct Slot {
    name: String,
    schema: Schema,
    required: bool,
}

/// Resolution state of one pass
pub struct SchemaResolver<'a> {
    registry: &'a SymbolRegistry<'a>,
    store: &'a DeclarationStore,
    overrides: &'a OverrideTable,
    config: PassConfig,
    definitions: BTreeMap<String, Schema>,
    /// definition name -> identity of the declaration or instance that owns it
    owners: HashMap<String, String>,
    override_stack: Vec<String>,
    embed_stack: Vec<String>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(
        registry: &'a SymbolRegistry<'a>,
        overrides: &'a OverrideTable,
        config: PassConfig,
    ) -> Self {
        SchemaResolver {
            registry,
            store: registry.store(),
            overrides,
            config,
            definitions: BTreeMap::new(),
            owners: HashMap::new(),
            override_stack: Vec::new(),
            embed_stack: Vec::new(),
        }
    }

    pub fn into_definitions(self) -> BTreeMap<String, Schema> {
        self.definitions
    }

    /// Resolve every declaration that can stand on its own, in declaration order.
    ///
    /// Generic declarations only appear through their instantiations. Function and
    /// channel declarations and overridden declarations are skipped.
    pub fn resolve_all(mut self) -> Result<BTreeMap<String, Schema>> {
        let store = self.store;
        for (id, decl) in store.types() {
            let standalone = decl.generics.is_empty()
                && self.overrides.get(&decl.fqn()).is_none()
                && !matches!(
                    self.shape(&decl.expr, &Env::at(&decl.unit, decl.scope.as_deref())),
                    TypeExpr::Function | TypeExpr::Channel(_)
                );
            if !standalone {
                debug!("Not resolving {} on its own", decl.fqn());
                continue;
            }
            self.resolve_declaration(id)?;
        }
        Ok(self.definitions)
    }

    /// Resolve only what is reachable from the named canonical names.
    ///
    /// # Errors
    ///
    /// A name that is not a canonical name of the registry is an `UnresolvedReference`.
    pub fn resolve_roots(mut self, names: &[String]) -> Result<BTreeMap<String, Schema>> {
        for name in names {
            let id = self
                .registry
                .by_canonical(name)
                .ok_or_else(|| Error::unresolved(name.clone(), "root list"))?;
            self.resolve_declaration(id)?;
        }
        Ok(self.definitions)
    }

    /// Resolve a non-generic declaration as if it were referenced from its own unit
    pub fn resolve_declaration(&mut self, id: DeclId) -> Result<Resolved> {
        let decl = self.store.get(id);
        let env = Env::at(&decl.unit, decl.scope.as_deref());
        let context = format!("declaration {}", decl.fqn());
        self.resolve_decl(id, &[], &env, &context)
    }

    /// Resolve a type expression written in `env`
    pub fn resolve(&mut self, expr: &TypeExpr, env: &Env, context: &str) -> Result<Resolved> {
        match expr {
            TypeExpr::Scalar(primitive) => {
                let (schema_type, format) = primitive.schema_type_and_format();
                Ok(Resolved::Schema(Schema::scalar(schema_type, format)))
            }
            TypeExpr::Pointer(inner) => self.resolve(inner, env, context),
            TypeExpr::Slice(inner) => Ok(match self.resolve(inner, env, context)? {
                Resolved::Schema(items) => Resolved::Schema(Schema::array(items)),
                Resolved::Elided => Resolved::Elided,
            }),
            TypeExpr::Map(_, value) => Ok(match self.resolve(value, env, context)? {
                Resolved::Schema(values) if values.is_any() => Resolved::Schema(Schema::map(None)),
                Resolved::Schema(values) => Resolved::Schema(Schema::map(Some(values))),
                Resolved::Elided => Resolved::Elided,
            }),
            TypeExpr::Any => Ok(Resolved::Schema(Schema::any())),
            TypeExpr::Composite(fields) => {
                let slots = self.object_slots(fields, env, None, context)?;
                Ok(Resolved::Schema(object_from_slots(slots)))
            }
            TypeExpr::Function | TypeExpr::Channel(_) => {
                Err(Error::invalid_shape(expr.to_string(), context))
            }
            TypeExpr::Named { path, args } => self.resolve_named(path, args, env, context),
        }
    }

    fn resolve_named(
        &mut self,
        path: &[String],
        args: &[TypeExpr],
        env: &Env,
        context: &str,
    ) -> Result<Resolved> {
        if args.is_empty() {
            if let Some(binding) = env.binding(path) {
                let binding = binding.clone();
                return self.resolve(&binding.expr, &binding.env, context);
            }
        }

        let lookup = self
            .registry
            .lookup(&env.unit, env.scope.as_deref(), path);
        let fqn = match &lookup {
            Lookup::Declared(id) => self.store.get(*id).fqn(),
            Lookup::External(name) => name.clone(),
        };

        if let Some(entry) = self.overrides.get(&fqn) {
            return self.apply_override(&fqn, entry.clone(), context);
        }

        match lookup {
            Lookup::Declared(id) => self.resolve_decl(id, args, env, context),
            Lookup::External(name) => {
                let named = TypeExpr::Named {
                    path: path.to_vec(),
                    args: args.to_vec(),
                };
                if let Some(shape) = named.builtin() {
                    return self.resolve(&shape, env, context);
                }
                match well_known(&name) {
                    Some(schema) => Ok(Resolved::Schema(schema)),
                    None => Err(Error::unresolved(name, context)),
                }
            }
        }
    }

    /// One step from a std wrapper, container or channel name to its structure.
    /// Declared, bound and overridden names are left alone.
    fn std_form(&self, expr: &TypeExpr, env: &Env) -> Option<TypeExpr> {
        let TypeExpr::Named { path, args } = expr else {
            return None;
        };
        if args.is_empty() && env.binding(path).is_some() {
            return None;
        }
        match self.registry.lookup(&env.unit, env.scope.as_deref(), path) {
            Lookup::External(name) if self.overrides.get(&name).is_none() => expr.builtin(),
            _ => None,
        }
    }

    /// The expression with outer std wrappers and containers interpreted
    fn shape(&self, expr: &TypeExpr, env: &Env) -> TypeExpr {
        let mut current = expr.clone();
        while let Some(next) = self.std_form(&current, env) {
            current = next;
        }
        current
    }

    fn apply_override(&mut self, fqn: &str, entry: Override, context: &str) -> Result<Resolved> {
        match entry {
            Override::Elide => {
                debug!("{} is elided by override", fqn);
                Ok(Resolved::Elided)
            }
            Override::Replace(replacement) => {
                if self.override_stack.iter().any(|seen| seen == fqn) {
                    return Err(Error::invalid_shape(
                        fqn,
                        format!("override replacements loop ({})", self.override_stack.join(" -> ")),
                    ));
                }
                debug!("{} is replaced by {}", fqn, replacement);
                self.override_stack.push(fqn.to_string());
                let resolved = self.resolve(&replacement, &Env::root(), context);
                self.override_stack.pop();
                resolved
            }
        }
    }

    fn resolve_decl(
        &mut self,
        id: DeclId,
        args: &[TypeExpr],
        use_env: &Env,
        context: &str,
    ) -> Result<Resolved> {
        let store = self.store;
        let decl = store.get(id);
        if decl.generics.len() != args.len() {
            return Err(Error::invalid_shape(
                format!("{} with {} type arguments", decl.fqn(), args.len()),
                format!(
                    "{} expects {} ({})",
                    decl.name,
                    decl.generics.len(),
                    context
                ),
            ));
        }
        let env = decl_env(decl, args, use_env);
        let shape = self.shape(&decl.expr, &env);

        match &shape {
            TypeExpr::Function | TypeExpr::Channel(_) => {
                Err(Error::invalid_shape(decl.fqn(), context))
            }
            TypeExpr::Scalar(_) if decl.enum_values.is_empty() => {
                self.resolve(&shape, &env, context)
            }
            TypeExpr::Named { .. } | TypeExpr::Pointer(_) | TypeExpr::Any => {
                self.resolve(&shape, &env, context)
            }
            TypeExpr::Scalar(_) | TypeExpr::Composite(_) | TypeExpr::Slice(_) | TypeExpr::Map(..) => {
                let name = self.instance_name(id, args, use_env, context)?;
                let identity = self.instance_identity(id, args, use_env);
                if self.definitions.contains_key(&name) {
                    self.check_owner(&name, &identity)?;
                    return Ok(Resolved::Schema(Schema::reference(&name)));
                }

                debug!("Registering definition {} for {}", name, identity);
                self.owners.insert(name.clone(), identity);
                self.definitions.insert(name.clone(), Schema::any());

                match self.definition_body(decl, &shape, &env)? {
                    Resolved::Schema(body) => {
                        self.definitions.insert(name.clone(), body);
                        Ok(Resolved::Schema(Schema::reference(&name)))
                    }
                    Resolved::Elided => {
                        self.definitions.remove(&name);
                        self.owners.remove(&name);
                        Ok(Resolved::Elided)
                    }
                }
            }
        }
    }

    fn check_owner(&self, name: &str, identity: &str) -> Result<()> {
        match self.owners.get(name) {
            Some(owner) if owner != identity => Err(Error::NamingConflict {
                name: name.to_string(),
                first: owner.clone(),
                second: identity.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn definition_body(&mut self, decl: &TypeDecl, shape: &TypeExpr, env: &Env) -> Result<Resolved> {
        let context = format!("declaration {}", decl.fqn());
        let resolved = match shape {
            TypeExpr::Composite(fields) => {
                let outer = std::mem::replace(&mut self.embed_stack, vec![decl.fqn()]);
                let slots = self.object_slots(fields, env, decl.rename_all, &decl.name);
                self.embed_stack = outer;
                Resolved::Schema(object_from_slots(slots?))
            }
            TypeExpr::Scalar(primitive) => {
                let (schema_type, format) = primitive.schema_type_and_format();
                let mut schema = Schema::scalar(schema_type, format);
                let meta = enums::metadata(&decl.enum_values);
                schema.enum_values = meta.values;
                schema.enum_var_names = meta.var_names;
                schema.enum_comments = meta.comments;
                schema.enum_descriptions = meta.descriptions;
                Resolved::Schema(schema)
            }
            other => self.resolve(other, env, &context)?,
        };
        Ok(match resolved {
            Resolved::Schema(mut schema) => {
                if schema.description.is_none() {
                    schema.description = decl.doc.clone().or_else(|| self.routine_doc(decl));
                }
                Resolved::Schema(schema)
            }
            Resolved::Elided => Resolved::Elided,
        })
    }

    /// Documentation of the routine a local declaration lives in
    fn routine_doc(&self, decl: &TypeDecl) -> Option<String> {
        let scope = decl.scope.as_deref()?;
        self.store.routine(&decl.unit, scope)?.doc.clone()
    }

    /// Properties of a composite after embedding, in declaration order.
    /// Direct fields beat embedded ones; among embedded fields the first one wins.
    fn object_slots(
        &mut self,
        fields: &[Field],
        env: &Env,
        rename_all: Option<NamingStrategy>,
        owner: &str,
    ) -> Result<Vec<Slot>> {
        let mut candidates: Vec<(Slot, bool)> = Vec::new();

        for field in fields {
            let context = format!("field `{}.{}`", owner, field.name);
            let name = match field.directives.disposition() {
                Disposition::Ignore => continue,
                Disposition::Embed => {
                    if let Some(target) = self.embedded_composite(&field.ty, env) {
                        for slot in self.embed(target, &context)? {
                            candidates.push((slot, false));
                        }
                        continue;
                    }
                    debug!("{} is not an embeddable composite; kept as a property", context);
                    self.property_name(&field.name, rename_all)
                }
                Disposition::Renamed(name) => name.to_string(),
                Disposition::Default => self.property_name(&field.name, rename_all),
            };

            let schema = match self.resolve(&field.ty, env, &context)? {
                Resolved::Schema(schema) => schema,
                Resolved::Elided => continue,
            };
            let schema = self.decorate(schema, field);
            let required = field.directives.required
                || (self.config.required_by_default && !self.shape(&field.ty, env).is_pointer());
            candidates.push((
                Slot {
                    name,
                    schema,
                    required,
                },
                true,
            ));
        }

        let direct: HashSet<String> = candidates
            .iter()
            .filter(|(_, is_direct)| *is_direct)
            .map(|(slot, _)| slot.name.clone())
            .collect();
        let mut seen = HashSet::new();
        let mut slots = Vec::new();
        for (slot, is_direct) in candidates {
            if !is_direct && direct.contains(&slot.name) {
                debug!("Embedded property {} of {} is shadowed", slot.name, owner);
                continue;
            }
            if seen.insert(slot.name.clone()) {
                slots.push(slot);
            }
        }
        Ok(slots)
    }

    fn property_name(&self, declared: &str, rename_all: Option<NamingStrategy>) -> String {
        rename_all.unwrap_or(self.config.strategy).apply(declared)
    }

    /// Follow bindings and aliases to a named composite, if the field type is one
    fn embedded_composite(&self, ty: &TypeExpr, env: &Env) -> Option<(DeclId, Env)> {
        let shape = self.shape(ty.pointee(), env);
        let TypeExpr::Named { path, args } = shape.pointee() else {
            return None;
        };
        if args.is_empty() {
            if let Some(binding) = env.binding(path) {
                return self.embedded_composite(&binding.expr, &binding.env);
            }
        }
        let Lookup::Declared(id) = self.registry.lookup(&env.unit, env.scope.as_deref(), path)
        else {
            return None;
        };
        let decl = self.store.get(id);
        if self.overrides.get(&decl.fqn()).is_some() || decl.generics.len() != args.len() {
            return None;
        }
        let decl_env = decl_env(decl, args, env);
        match &decl.expr {
            TypeExpr::Composite(_) => Some((id, decl_env)),
            TypeExpr::Named { .. } | TypeExpr::Pointer(_) => {
                self.embedded_composite(&decl.expr, &decl_env)
            }
            _ => None,
        }
    }

    /// Splice the properties of an embedded composite
    fn embed(&mut self, (id, env): (DeclId, Env), context: &str) -> Result<Vec<Slot>> {
        let store = self.store;
        let decl = store.get(id);
        let fqn = decl.fqn();
        if self.embed_stack.contains(&fqn) {
            return Err(Error::invalid_shape(
                fqn,
                format!("recursive embedding ({})", context),
            ));
        }
        let TypeExpr::Composite(fields) = &decl.expr else {
            return Ok(Vec::new());
        };
        self.embed_stack.push(fqn);
        let slots = self.object_slots(fields, &env, decl.rename_all, &decl.name);
        self.embed_stack.pop();
        slots
    }

    /// Attach field documentation, example and validation keywords
    fn decorate(&self, schema: Schema, field: &Field) -> Schema {
        let directives = &field.directives;
        let mut schema = if directives.as_string {
            stringify(schema)
        } else {
            schema
        };

        if let Some(format) = &directives.format {
            match schema.kind() {
                SchemaKind::Scalar => schema.format = Some(format.clone()),
                SchemaKind::Array => {
                    if let Some(items) = schema.items.as_mut() {
                        if items.kind() == SchemaKind::Scalar {
                            items.format = Some(format.clone());
                        }
                    }
                }
                _ => debug!("format `{}` ignored on field {}", format, field.name),
            }
        }

        let needs_wrapper =
            schema.kind() == SchemaKind::Ref && (field.doc.is_some() || directives.has_metadata());
        if needs_wrapper {
            schema = Schema::wrapper(schema);
        }

        if let Some(doc) = &field.doc {
            schema.description = Some(doc.clone());
        }
        if directives.read_only {
            schema.read_only = Some(true);
        }
        if let Some(example) = &directives.example {
            let value = example_value(example, self.effective(&schema));
            schema.example = Some(value);
        }

        let is_array = self.effective(&schema).kind() == SchemaKind::Array;
        schema.minimum = directives.minimum;
        schema.maximum = directives.maximum;
        if is_array {
            schema.min_items = directives.min_length;
            schema.max_items = directives.max_length;
        } else {
            schema.min_length = directives.min_length;
            schema.max_length = directives.max_length;
        }
        if directives.pattern.is_some() {
            schema.pattern = directives.pattern.clone();
        }
        schema
    }

    /// The schema a reference or wrapper stands for, as far as it is known yet
    fn effective<'s>(&'s self, schema: &'s Schema) -> &'s Schema {
        let target = match schema.kind() {
            SchemaKind::Ref => schema.ref_name(),
            SchemaKind::Wrapper => schema.all_of.first().and_then(Schema::ref_name),
            _ => None,
        };
        target
            .and_then(|name| self.definitions.get(name))
            .unwrap_or(schema)
    }

    /// Definition name of a declaration or generic instance: `Base-Arg1-Arg2`
    fn instance_name(
        &self,
        id: DeclId,
        args: &[TypeExpr],
        env: &Env,
        context: &str,
    ) -> Result<String> {
        let base = self.registry.canonical_name(id).to_string();
        if args.is_empty() {
            return Ok(base);
        }
        let mut parts = vec![base];
        for arg in args {
            parts.push(self.arg_name(arg, env, context)?);
        }
        Ok(parts.join("-"))
    }

    fn arg_name(&self, arg: &TypeExpr, env: &Env, context: &str) -> Result<String> {
        Ok(match arg {
            TypeExpr::Scalar(primitive) => primitive.rust_name().to_string(),
            TypeExpr::Pointer(inner) => self.arg_name(inner, env, context)?,
            TypeExpr::Slice(inner) => format!("array_{}", self.arg_name(inner, env, context)?),
            TypeExpr::Map(_, value) => format!("map_{}", self.arg_name(value, env, context)?),
            TypeExpr::Any => "any".to_string(),
            TypeExpr::Composite(_) => "object".to_string(),
            TypeExpr::Function | TypeExpr::Channel(_) => {
                return Err(Error::invalid_shape(arg.to_string(), context))
            }
            TypeExpr::Named { path, args } => {
                if args.is_empty() {
                    if let Some(binding) = env.binding(path) {
                        return self.arg_name(&binding.expr, &binding.env, context);
                    }
                }
                match self.registry.lookup(&env.unit, env.scope.as_deref(), path) {
                    Lookup::Declared(id) => self.instance_name(id, args, env, context)?.replace('.', "_"),
                    Lookup::External(name) => match self.overrides.get(&name) {
                        Some(Override::Replace(TypeExpr::Named { path, .. })) => {
                            path.last().cloned().unwrap_or_default()
                        }
                        Some(Override::Replace(replacement)) => {
                            self.arg_name(replacement, &Env::root(), context)?
                        }
                        _ => match arg.builtin() {
                            Some(shape) => self.arg_name(&shape, env, context)?,
                            None => name.rsplit("::").next().unwrap_or(&name).to_string(),
                        },
                    },
                }
            }
        })
    }

    /// Identity of a declaration or instance, independent of display names
    fn instance_identity(&self, id: DeclId, args: &[TypeExpr], env: &Env) -> String {
        let fqn = self.store.get(id).fqn();
        if args.is_empty() {
            return fqn;
        }
        let rendered: Vec<String> = args.iter().map(|a| self.arg_identity(a, env, 0)).collect();
        format!("{}<{}>", fqn, rendered.join(", "))
    }

    fn arg_identity(&self, arg: &TypeExpr, env: &Env, depth: usize) -> String {
        match arg {
            TypeExpr::Named { path, args } if depth < 32 => {
                if args.is_empty() {
                    if let Some(binding) = env.binding(path) {
                        return self.arg_identity(&binding.expr, &binding.env, depth + 1);
                    }
                }
                let base = match self.registry.lookup(&env.unit, env.scope.as_deref(), path) {
                    Lookup::Declared(id) => self.store.get(id).fqn(),
                    Lookup::External(name) => match arg.builtin() {
                        Some(shape) if self.overrides.get(&name).is_none() => {
                            return self.arg_identity(&shape, env, depth + 1)
                        }
                        _ => name,
                    },
                };
                if args.is_empty() {
                    base
                } else {
                    let rendered: Vec<String> = args
                        .iter()
                        .map(|a| self.arg_identity(a, env, depth + 1))
                        .collect();
                    format!("{}<{}>", base, rendered.join(", "))
                }
            }
            // `Option<T>` and `T` produce the same schema
            TypeExpr::Pointer(inner) => self.arg_identity(inner, env, depth + 1),
            TypeExpr::Slice(inner) => format!("Vec<{}>", self.arg_identity(inner, env, depth + 1)),
            TypeExpr::Map(key, value) => format!(
                "Map<{}, {}>",
                self.arg_identity(key, env, depth + 1),
                self.arg_identity(value, env, depth + 1)
            ),
            other => other.to_string(),
        }
    }
}

/// Environment of a declaration's body, binding its type parameters to `args`
fn decl_env(decl: &TypeDecl, args: &[TypeExpr], use_env: &Env) -> Env {
    let bindings = decl
        .generics
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            (
                param.clone(),
                Binding {
                    expr: arg.clone(),
                    env: use_env.clone(),
                },
            )
        })
        .collect();
    Env {
        unit: decl.unit.clone(),
        scope: decl.scope.clone(),
        bindings: Rc::new(bindings),
    }
}

fn object_from_slots(slots: Vec<Slot>) -> Schema {
    let mut schema = Schema::object();
    let mut properties = IndexMap::new();
    for slot in slots {
        if slot.required {
            schema.required.push(slot.name.clone());
        }
        properties.insert(slot.name, slot.schema);
    }
    schema.properties = properties;
    schema
}

/// Numbers and booleans rendered as strings
fn stringify(mut schema: Schema) -> Schema {
    if matches!(
        schema.schema_type.as_deref(),
        Some("integer") | Some("number") | Some("boolean")
    ) {
        schema.schema_type = Some("string".to_string());
        schema.format = None;
    }
    schema
}

/// Schemas for common third-party types that are not declared in the tree
fn well_known(fqn: &str) -> Option<Schema> {
    if fqn == "serde_json::Value" || fqn.ends_with("::serde_json::Value") {
        return Some(Schema::any());
    }
    if fqn == "serde_json::Map" {
        return Some(Schema::map(None));
    }
    let last = fqn.rsplit("::").next().unwrap_or(fqn);
    let schema = match last {
        "Uuid" => Schema::scalar("string", Some("uuid")),
        "DateTime" | "NaiveDateTime" | "OffsetDateTime" | "SystemTime" => {
            Schema::scalar("string", Some("date-time"))
        }
        "NaiveDate" => Schema::scalar("string", Some("date")),
        "Decimal" | "PathBuf" => Schema::scalar("string", None),
        "Url" => Schema::scalar("string", Some("uri")),
        _ => return None,
    };
    Some(schema)
}

/// Type an example string by the schema it annotates
fn example_value(text: &str, schema: &Schema) -> serde_json::Value {
    let trimmed = text.trim();
    match schema.schema_type.as_deref() {
        Some("integer") => match trimmed.parse::<i64>() {
            Ok(value) => serde_json::Value::from(value),
            Err(_) => untyped_example(text),
        },
        Some("number") => match trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            Some(number) => serde_json::Value::Number(number),
            None => untyped_example(text),
        },
        Some("boolean") => match trimmed.parse::<bool>() {
            Ok(value) => serde_json::Value::Bool(value),
            Err(_) => untyped_example(text),
        },
        Some("array") => serde_json::Value::Array(
            trimmed
                .split(',')
                .map(|part| match schema.items.as_deref() {
                    Some(items) => example_value(part, items),
                    None => serde_json::Value::String(part.trim().to_string()),
                })
                .collect(),
        ),
        Some("object") => match &schema.additional_properties {
            Some(additional) => {
                let mut map = serde_json::Map::new();
                for pair in trimmed.split(',') {
                    let Some((key, value)) = pair.split_once(':') else {
                        return untyped_example(text);
                    };
                    let value = match additional {
                        AdditionalProperties::Schema(values) => example_value(value, values),
                        AdditionalProperties::Allowed(_) => {
                            serde_json::Value::String(value.trim().to_string())
                        }
                    };
                    map.insert(key.trim().to_string(), value);
                }
                serde_json::Value::Object(map)
            }
            None => untyped_example(text),
        },
        _ => serde_json::Value::String(text.to_string()),
    }
}

fn untyped_example(text: &str) -> serde_json::Value {
    warn!("Example `{}` does not match its schema type; emitted as a string", text);
    serde_json::Value::String(text.to_string())
}

/// Run one complete pass over a populated store.
///
/// `roots` restricts the output to definitions reachable from the named canonical
/// names; an empty list resolves every declaration.
///
/// # Errors
///
/// Returns the first fatal condition in declaration order: a naming conflict, an
/// unresolved reference or an invalid type shape.
pub fn resolve_pass(
    store: &DeclarationStore,
    overrides: &OverrideTable,
    config: PassConfig,
    roots: &[String],
) -> Result<BTreeMap<String, Schema>> {
    let registry = SymbolRegistry::build(store)?;
    let resolver = SchemaResolver::new(&registry, overrides, config);
    if roots.is_empty() {
        resolver.resolve_all()
    } else {
        resolver.resolve_roots(roots)
    }
}
