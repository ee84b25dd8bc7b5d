//! Type lattice: registry of named types and ancestor queries

use crate::builtins;
use crate::error::TypeError;
use crate::ty::{Method, TypeDef, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Deepest hierarchy (in parent links below the root) that
/// [`TypeLattice::common_ancestor`] is known to handle.
pub const VERIFIED_DEPTH: usize = 2;

/// Registry of every type known to a compilation
///
/// Types live in an arena and are addressed by [`TypeId`]. Lookups by name go
/// through a side index, since the AST refers to types by name only.
#[derive(Debug, Clone)]
pub struct TypeLattice {
    types: Vec<TypeDef>,
    by_name: FxHashMap<String, TypeId>,
    root: Option<TypeId>,
}

impl TypeLattice {
    /// Create a lattice holding only the built-in types
    pub fn new() -> Self {
        let mut lattice = Self::empty();
        for (name, parent, methods) in builtins::definitions() {
            let parent = parent.and_then(|p| lattice.lookup(p));
            let id = lattice.insert(name.to_string(), parent);
            for method in methods {
                lattice.types[id.0 as usize]
                    .methods
                    .insert(method.name.clone(), method);
            }
        }
        lattice
    }

    /// Lattice with no types at all, not even the root
    fn empty() -> Self {
        Self {
            types: Vec::new(),
            by_name: FxHashMap::default(),
            root: None,
        }
    }

    fn insert(&mut self, name: String, parent: Option<TypeId>) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        if parent.is_none() {
            self.root = Some(id);
        }
        self.by_name.insert(name.clone(), id);
        self.types.push(TypeDef::new(name, parent));
        id
    }

    /// Register a new type
    ///
    /// Fails if `name` is taken or `parent` is not registered. A type without a
    /// parent becomes the root, which is only allowed once.
    pub fn register(
        &mut self,
        name: &str,
        parent: Option<&str>,
        methods: Vec<Method>,
        properties: Vec<(String, TypeId)>,
    ) -> Result<TypeId, TypeError> {
        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateType {
                name: name.to_string(),
            });
        }

        let parent_id = match parent {
            Some(parent) => Some(self.require(parent)?),
            None if self.root.is_some() => {
                return Err(TypeError::SecondRoot {
                    name: name.to_string(),
                })
            }
            None => None,
        };

        // Validate everything before inserting, so a failed call registers nothing.
        let mut seen = FxHashSet::default();
        if let Some(dup) = methods.iter().find(|m| !seen.insert(m.name.as_str())) {
            return Err(TypeError::DuplicateMethod {
                method: dup.name.clone(),
                ty: name.to_string(),
            });
        }

        let id = self.insert(name.to_string(), parent_id);
        for method in methods {
            self.add_method(id, method)?;
        }
        for (prop, ty) in properties {
            self.set_property(id, prop, ty);
        }

        tracing::trace!(name, parent = ?parent, id = id.0, "registered type");
        Ok(id)
    }

    /// Record a method on `ty`
    pub fn add_method(&mut self, ty: TypeId, method: Method) -> Result<(), TypeError> {
        let def = &mut self.types[ty.0 as usize];
        if def.methods.contains_key(&method.name) {
            return Err(TypeError::DuplicateMethod {
                method: method.name,
                ty: def.name.clone(),
            });
        }
        def.methods.insert(method.name.clone(), method);
        Ok(())
    }

    /// Set (or replace) the type of a property on `ty`
    pub fn set_property(&mut self, ty: TypeId, name: impl Into<String>, prop_ty: TypeId) {
        self.types[ty.0 as usize]
            .properties
            .insert(name.into(), prop_ty);
    }

    /// Look up a type by name
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Look up a type by name, failing with [`TypeError::UnknownType`]
    pub fn require(&self, name: &str) -> Result<TypeId, TypeError> {
        self.lookup(name).ok_or_else(|| TypeError::UnknownType {
            name: name.to_string(),
        })
    }

    /// Whether a type with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Get a type definition
    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    /// Name of a type
    pub fn name(&self, id: TypeId) -> &str {
        &self.types[id.0 as usize].name
    }

    /// Parent of a type (`None` for the root)
    pub fn parent(&self, id: TypeId) -> Option<TypeId> {
        self.types[id.0 as usize].parent
    }

    /// The root type, if it has been defined
    pub fn root(&self) -> Option<TypeId> {
        self.root
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the lattice is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// `ty` followed by each of its ancestors up to the root
    pub fn ancestors(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(Some(ty), move |id| self.parent(*id))
    }

    /// Number of parent links between `ty` and the root
    pub fn depth(&self, ty: TypeId) -> usize {
        self.ancestors(ty).count() - 1
    }

    /// Whether `sub` is `sup` or one of its descendants
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        self.ancestors(sub).any(|id| id == sup)
    }

    /// Nearest type in `ty`'s ancestor chain (including `ty`) that declares `method`
    pub fn declaring_ancestor(&self, ty: TypeId, method: &str) -> Result<TypeId, TypeError> {
        self.ancestors(ty)
            .find(|id| self.get(*id).declares(method))
            .ok_or_else(|| TypeError::UnknownMethod {
                method: method.to_string(),
                ty: self.name(ty).to_string(),
            })
    }

    /// Resolve a method call on `ty`: the declaring ancestor and its signature
    pub fn resolve_method(&self, ty: TypeId, method: &str) -> Result<(TypeId, &Method), TypeError> {
        let owner = self.declaring_ancestor(ty, method)?;
        let signature = self.get(owner).methods.get(method).ok_or_else(|| {
            TypeError::UnknownMethod {
                method: method.to_string(),
                ty: self.name(ty).to_string(),
            }
        })?;
        Ok((owner, signature))
    }

    /// Shared supertype of `a` and `b`
    ///
    /// Holds `a` fixed while walking `b` to the root; on reaching the root
    /// without a match, `a` moves up one step and the walk from `b` restarts.
    /// This is only known to be a least common ancestor for hierarchies at most
    /// [`VERIFIED_DEPTH`] levels deep; deeper operands are reported, not fixed.
    pub fn common_ancestor(&self, a: TypeId, b: TypeId) -> TypeId {
        let Some(root) = self.root else {
            return a;
        };

        if self.depth(a) > VERIFIED_DEPTH || self.depth(b) > VERIFIED_DEPTH {
            tracing::warn!(
                a = self.name(a),
                b = self.name(b),
                "common ancestor of a hierarchy deeper than {} levels is unverified",
                VERIFIED_DEPTH
            );
        }

        let mut t1 = a;
        let mut t2 = b;
        loop {
            if t1 == t2 {
                return t1;
            }
            if t2 == root {
                match self.parent(t1) {
                    Some(parent) => {
                        t1 = parent;
                        t2 = b;
                    }
                    None => return root,
                }
            } else {
                t2 = self.parent(t2).unwrap_or(root);
            }
        }
    }

    /// Unify a set of types by folding pairs through [`common_ancestor`](Self::common_ancestor)
    ///
    /// The last two entries are popped and replaced with their common ancestor
    /// until one remains. Returns `None` for an empty set.
    pub fn join(&self, types: &[TypeId]) -> Option<TypeId> {
        let mut pending = types.to_vec();
        while pending.len() > 1 {
            let b = pending.pop()?;
            let a = pending.pop()?;
            pending.push(self.common_ancestor(a, b));
        }
        pending.pop()
    }
}

impl Default for TypeLattice {
    fn default() -> Self {
        Self::new()
    }
}
