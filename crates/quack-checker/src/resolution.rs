//! Output of the resolution pass

use crate::symbols::{ScopeKey, Symbols};
use quack_ast::{Node, NodeId};
use quack_types::{TypeId, TypeLattice};
use rustc_hash::FxHashMap;

/// Everything the code generator needs from resolution
///
/// Node annotations are keyed by [`NodeId`], so a `Resolution` is only valid
/// for the exact tree (same allocation) it was produced from.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub(crate) lattice: TypeLattice,
    pub(crate) symbols: Symbols,
    /// Static type of every resolved node
    pub(crate) expr_types: FxHashMap<NodeId, TypeId>,
    /// Declaring ancestor of each method call
    pub(crate) call_targets: FxHashMap<NodeId, TypeId>,
    /// Class of the receiver of each field read or field assignment
    pub(crate) receivers: FxHashMap<NodeId, TypeId>,
    pub(crate) program_name: String,
    pub(crate) classes: Vec<String>,
}

impl Resolution {
    /// Final type lattice, including user classes
    pub fn lattice(&self) -> &TypeLattice {
        &self.lattice
    }

    /// Final symbol tables
    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Name of the top-level program type
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// User classes in the order they were registered
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Resolved type of a node
    pub fn type_of(&self, node: &Node) -> Option<TypeId> {
        self.expr_types.get(&node.id()).copied()
    }

    /// Name of the resolved type of a node
    pub fn type_name_of(&self, node: &Node) -> Option<&str> {
        self.type_of(node).map(|ty| self.lattice.name(ty))
    }

    /// Type that declares the method invoked by a method-call node
    pub fn call_target(&self, node: &Node) -> Option<TypeId> {
        self.call_targets.get(&node.id()).copied()
    }

    /// Receiver class of a field read, or of the field target of an assignment
    pub fn receiver_type(&self, node: &Node) -> Option<TypeId> {
        self.receivers.get(&node.id()).copied()
    }

    /// Unified type of a local variable
    pub fn variable_type(&self, scope: &ScopeKey, name: &str) -> Option<TypeId> {
        self.symbols
            .locals(scope)?
            .get(name)?
            .joined_type(&self.lattice)
    }

    /// Unified type of a field
    pub fn field_type(&self, class: &str, field: &str) -> Option<TypeId> {
        self.symbols
            .fields(class)?
            .get(field)?
            .joined_type(&self.lattice)
    }
}
