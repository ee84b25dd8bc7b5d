//! Symbol tables for variables and fields
//!
//! A symbol is created by the first assignment to its name and only ever
//! grows: each later assignment adds the assigned type to `possible_types`.
//! Tables keep insertion order so generated `.local` and `.field` lists are
//! deterministic.

use quack_types::{TypeId, TypeLattice};
use rustc_hash::FxHashMap;

/// Name of the implicit method holding a class body
pub const CONSTRUCTOR: &str = "$constructor";

/// A variable or field slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbol {
    /// Every type assigned to this slot, in first-seen order
    pub possible_types: Vec<TypeId>,
    /// Set by the first resolved assignment
    pub initialized: bool,
    /// Declared as a method or constructor parameter
    pub is_parameter: bool,
}

impl Symbol {
    /// Record an observed type; duplicates are ignored
    pub fn add_type(&mut self, ty: TypeId) {
        if !self.possible_types.contains(&ty) {
            self.possible_types.push(ty);
        }
    }

    /// Unified type of this slot, or `None` if nothing was ever assigned
    pub fn joined_type(&self, lattice: &TypeLattice) -> Option<TypeId> {
        lattice.join(&self.possible_types)
    }
}

/// Error returned when a parameter name is declared twice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSymbolError {
    /// The repeated name
    pub name: String,
}

/// Insertion-ordered table of symbols for one scope
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<(String, Symbol)>,
    index: FxHashMap<String, usize>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a symbol
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Symbol for `name`, created uninitialized if absent
    pub fn get_or_create(&mut self, name: &str) -> &mut Symbol {
        let existing = self.index.get(name).copied();
        let i = match existing {
            Some(i) => i,
            None => {
                let i = self.entries.len();
                self.entries.push((name.to_string(), Symbol::default()));
                self.index.insert(name.to_string(), i);
                i
            }
        };
        &mut self.entries[i].1
    }

    /// Declare an initialized parameter of type `ty`
    pub fn define_parameter(&mut self, name: &str, ty: TypeId) -> Result<(), DuplicateSymbolError> {
        if self.index.contains_key(name) {
            return Err(DuplicateSymbolError {
                name: name.to_string(),
            });
        }
        let symbol = self.get_or_create(name);
        symbol.add_type(ty);
        symbol.initialized = true;
        symbol.is_parameter = true;
        Ok(())
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All symbols in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.entries.iter().map(|(name, sym)| (name.as_str(), sym))
    }

    /// Names of parameters, in declaration order
    pub fn parameters(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, sym)| sym.is_parameter)
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of non-parameter symbols, in first-assignment order
    pub fn locals(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, sym)| !sym.is_parameter)
            .map(|(name, _)| name)
            .collect()
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key of a local scope: the method `function` of class `class`
///
/// Class bodies and the top-level program use [`CONSTRUCTOR`] as the
/// function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    pub class: String,
    pub function: String,
}

impl ScopeKey {
    pub fn new(class: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            function: function.into(),
        }
    }

    /// Scope of a class constructor
    pub fn constructor(class: impl Into<String>) -> Self {
        Self::new(class, CONSTRUCTOR)
    }
}

/// The two symbol tables of a compilation: fields per class and locals per method
#[derive(Debug, Clone, Default)]
pub struct Symbols {
    fields: FxHashMap<String, SymbolTable>,
    locals: FxHashMap<ScopeKey, SymbolTable>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field table of a class
    pub fn fields(&self, class: &str) -> Option<&SymbolTable> {
        self.fields.get(class)
    }

    /// Field table of a class, created if absent
    pub fn fields_mut(&mut self, class: &str) -> &mut SymbolTable {
        self.fields.entry(class.to_string()).or_default()
    }

    /// Local table of a method
    pub fn locals(&self, scope: &ScopeKey) -> Option<&SymbolTable> {
        self.locals.get(scope)
    }

    /// Local table of a method, created if absent
    pub fn locals_mut(&mut self, scope: &ScopeKey) -> &mut SymbolTable {
        self.locals.entry(scope.clone()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_starts_uninitialized() {
        let mut table = SymbolTable::new();
        let sym = table.get_or_create("x");
        assert!(!sym.initialized);
        assert!(sym.possible_types.is_empty());
        assert!(table.contains("x"));
    }

    #[test]
    fn test_types_accumulate() {
        let lattice = TypeLattice::new();
        let int = lattice.lookup("Int").unwrap();
        let string = lattice.lookup("String").unwrap();

        let mut table = SymbolTable::new();
        table.get_or_create("x").add_type(int);
        table.get_or_create("x").add_type(int);
        assert_eq!(table.get("x").unwrap().possible_types, vec![int]);

        table.get_or_create("x").add_type(string);
        let sym = table.get("x").unwrap();
        assert_eq!(sym.possible_types, vec![int, string]);
        assert_eq!(sym.joined_type(&lattice), lattice.lookup("Obj"));
    }

    #[test]
    fn test_parameters_and_locals_keep_order() {
        let lattice = TypeLattice::new();
        let int = lattice.lookup("Int").unwrap();

        let mut table = SymbolTable::new();
        table.define_parameter("b", int).unwrap();
        table.get_or_create("z").initialized = true;
        table.define_parameter("a", int).unwrap();
        table.get_or_create("y").initialized = true;

        assert_eq!(table.parameters(), vec!["b", "a"]);
        assert_eq!(table.locals(), vec!["z", "y"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_duplicate_parameter() {
        let lattice = TypeLattice::new();
        let int = lattice.lookup("Int").unwrap();

        let mut table = SymbolTable::new();
        table.define_parameter("a", int).unwrap();
        let err = table.define_parameter("a", int).unwrap_err();
        assert_eq!(err.name, "a");
    }

    #[test]
    fn test_symbols_scopes() {
        let mut symbols = Symbols::new();
        let scope = ScopeKey::constructor("Dog");
        assert!(symbols.locals(&scope).is_none());
        symbols.locals_mut(&scope).get_or_create("x");
        assert!(symbols.locals(&scope).unwrap().contains("x"));
        assert!(symbols.locals(&ScopeKey::new("Dog", "bark")).is_none());

        symbols.fields_mut("Dog").get_or_create("name");
        assert!(symbols.fields("Dog").unwrap().contains("name"));
        assert!(symbols.fields("Cat").is_none());
    }
}
