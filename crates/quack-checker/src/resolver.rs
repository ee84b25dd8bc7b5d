//! Resolution pass
//!
//! Walks the whole tree once, in program order, before any code is generated:
//! - registers user classes in the type lattice
//! - fills the field and local symbol tables
//! - assigns a static type to every node
//! - resolves every method call to the ancestor that declares it
//!
//! The first error aborts the walk.

use crate::error::ResolveError;
use crate::resolution::Resolution;
use crate::symbols::{ScopeKey, Symbols};
use quack_ast::*;
use quack_types::builtins::{BOOLEAN, INT, NOTHING, OBJ, STRING};
use quack_types::{Method, TypeId, TypeLattice};
use rustc_hash::FxHashMap;

/// Default name of the top-level program type
pub const DEFAULT_PROGRAM_NAME: &str = "Main";

/// Resolver state for one compilation
pub struct Resolver {
    lattice: TypeLattice,
    symbols: Symbols,
    expr_types: FxHashMap<NodeId, TypeId>,
    call_targets: FxHashMap<NodeId, TypeId>,
    receivers: FxHashMap<NodeId, TypeId>,
    program_name: String,
    classes: Vec<String>,

    /// Local scope statements are currently resolved in
    scope: ScopeKey,
    /// Type of `this` in the current scope
    current_class: Option<TypeId>,
}

impl Resolver {
    /// Create a resolver over the built-in lattice
    pub fn new(program_name: impl Into<String>) -> Self {
        Self::with_lattice(TypeLattice::new(), program_name)
    }

    /// Create a resolver over a caller-supplied lattice
    pub fn with_lattice(lattice: TypeLattice, program_name: impl Into<String>) -> Self {
        let program_name = program_name.into();
        Resolver {
            lattice,
            symbols: Symbols::new(),
            expr_types: FxHashMap::default(),
            call_targets: FxHashMap::default(),
            receivers: FxHashMap::default(),
            scope: ScopeKey::constructor(program_name.clone()),
            program_name,
            classes: Vec::new(),
            current_class: None,
        }
    }

    /// Resolve a single root node
    pub fn resolve(self, root: &Node) -> Result<Resolution, ResolveError> {
        self.resolve_program(std::slice::from_ref(root))
    }

    /// Resolve top-level statements in order
    #[tracing::instrument(skip_all, fields(program = %self.program_name))]
    pub fn resolve_program(mut self, statements: &[Node]) -> Result<Resolution, ResolveError> {
        let program_ty = self
            .lattice
            .register(&self.program_name, Some(OBJ), vec![], vec![])?;
        self.current_class = Some(program_ty);
        self.symbols.locals_mut(&self.scope);

        self.resolve_block(statements)?;

        tracing::debug!(
            classes = self.classes.len(),
            types = self.lattice.len(),
            nodes = self.expr_types.len(),
            "resolution complete"
        );

        Ok(Resolution {
            lattice: self.lattice,
            symbols: self.symbols,
            expr_types: self.expr_types,
            call_targets: self.call_targets,
            receivers: self.receivers,
            program_name: self.program_name,
            classes: self.classes,
        })
    }

    fn builtin(&self, name: &str) -> Result<TypeId, ResolveError> {
        Ok(self.lattice.require(name)?)
    }

    fn self_type(&self) -> Result<TypeId, ResolveError> {
        self.current_class.ok_or_else(|| ResolveError::UnknownClass {
            name: SELF_NAME.to_string(),
        })
    }

    fn resolve_block(&mut self, block: &[Node]) -> Result<(), ResolveError> {
        for stmt in block {
            self.resolve_node(stmt)?;
        }
        Ok(())
    }

    fn resolve_node(&mut self, node: &Node) -> Result<TypeId, ResolveError> {
        let ty = match node {
            Node::Program(program) => {
                self.resolve_node(&program.left)?;
                self.resolve_node(&program.right)?;
                self.builtin(NOTHING)?
            }
            Node::If(stmt) => {
                self.resolve_if(stmt)?;
                self.builtin(NOTHING)?
            }
            Node::Loop(stmt) => {
                self.resolve_node(&stmt.condition)?;
                self.resolve_block(&stmt.block)?;
                self.builtin(NOTHING)?
            }
            Node::And(binary) | Node::Or(binary) => {
                self.resolve_node(&binary.left)?;
                self.resolve_node(&binary.right)?;
                self.builtin(BOOLEAN)?
            }
            Node::Not(unary) => {
                self.resolve_node(&unary.operand)?;
                self.builtin(BOOLEAN)?
            }
            Node::MethodCall(call) => self.resolve_call(node, call)?,
            Node::Negate(unary) => {
                self.resolve_node(&unary.operand)?;
                self.builtin(INT)?
            }
            Node::Number(_) => self.builtin(INT)?,
            Node::StringLiteral(_) => self.builtin(STRING)?,
            Node::BoolLiteral(_) => self.builtin(BOOLEAN)?,
            Node::VarRef(var) => self.resolve_var_ref(var)?,
            Node::FieldRef(field) => self.resolve_field_ref(node, field)?,
            Node::Assignment(assign) => {
                self.resolve_assignment(node, assign)?;
                self.builtin(NOTHING)?
            }
            Node::Class(class) => {
                self.resolve_class(class)?;
                self.builtin(NOTHING)?
            }
            Node::Instance(instance) => self.resolve_instance(instance)?,
        };

        self.expr_types.insert(node.id(), ty);
        Ok(ty)
    }

    fn resolve_if(&mut self, stmt: &If) -> Result<(), ResolveError> {
        self.resolve_node(&stmt.condition)?;
        self.resolve_block(&stmt.block)?;

        let mut elif = stmt.elif.as_deref();
        while let Some(clause) = elif {
            self.resolve_node(&clause.condition)?;
            self.resolve_block(&clause.block)?;
            elif = clause.elif.as_deref();
        }

        if let Some(else_block) = &stmt.else_block {
            self.resolve_block(&else_block.block)?;
        }
        Ok(())
    }

    fn resolve_call(&mut self, node: &Node, call: &MethodCall) -> Result<TypeId, ResolveError> {
        let receiver_ty = self.resolve_node(&call.receiver)?;
        for arg in &call.args {
            self.resolve_node(arg)?;
        }

        let (owner, return_type) = {
            let (owner, method) = self.lattice.resolve_method(receiver_ty, &call.method)?;
            (owner, method.return_type.clone())
        };
        let ty = self.lattice.require(&return_type)?;

        tracing::trace!(
            method = %call.method,
            receiver = self.lattice.name(receiver_ty),
            owner = self.lattice.name(owner),
            "resolved call"
        );
        self.call_targets.insert(node.id(), owner);
        Ok(ty)
    }

    /// Type of an initialized local in the current scope
    fn variable_type(&self, name: &str) -> Result<TypeId, ResolveError> {
        let uninitialized = || ResolveError::UninitializedUse {
            name: name.to_string(),
        };

        let symbol = self
            .symbols
            .locals(&self.scope)
            .and_then(|table| table.get(name))
            .filter(|symbol| symbol.initialized)
            .ok_or_else(uninitialized)?;
        symbol.joined_type(&self.lattice).ok_or_else(uninitialized)
    }

    fn resolve_var_ref(&self, var: &VarRef) -> Result<TypeId, ResolveError> {
        if var.is_self() {
            return self.self_type();
        }
        self.variable_type(&var.name)
    }

    /// Class of the object named by a field receiver
    fn receiver_class(&self, receiver: &str) -> Result<TypeId, ResolveError> {
        if receiver == SELF_NAME {
            self.self_type()
        } else {
            self.variable_type(receiver)
        }
    }

    /// Type of an initialized field declared on `owner` or one of its ancestors
    fn field_type(&self, owner: TypeId, field: &str) -> Option<TypeId> {
        self.lattice.ancestors(owner).find_map(|class| {
            let symbol = self
                .symbols
                .fields(self.lattice.name(class))?
                .get(field)
                .filter(|symbol| symbol.initialized)?;
            symbol.joined_type(&self.lattice)
        })
    }

    fn resolve_field_ref(&mut self, node: &Node, field: &FieldAccess) -> Result<TypeId, ResolveError> {
        let owner = self.receiver_class(&field.receiver)?;
        let ty = self
            .field_type(owner, &field.field)
            .ok_or_else(|| ResolveError::UninitializedUse {
                name: format!("{}.{}", field.receiver, field.field),
            })?;
        self.receivers.insert(node.id(), owner);
        Ok(ty)
    }

    fn resolve_assignment(&mut self, node: &Node, assign: &Assignment) -> Result<(), ResolveError> {
        let value_ty = self.resolve_node(&assign.value)?;

        match &assign.target {
            Target::Var(var) => {
                let declared = match &var.declared_type {
                    Some(name) => Some(self.lattice.require(name)?),
                    None => None,
                };
                let symbol = self.symbols.locals_mut(&self.scope).get_or_create(&var.name);
                if let Some(declared) = declared {
                    symbol.add_type(declared);
                }
                symbol.add_type(value_ty);
                symbol.initialized = true;
            }
            Target::Field(field) => {
                let owner = self.receiver_class(&field.receiver)?;
                let class_name = self.lattice.name(owner).to_string();
                let symbol = self.symbols.fields_mut(&class_name).get_or_create(&field.field);
                symbol.add_type(value_ty);
                symbol.initialized = true;
                self.receivers.insert(node.id(), owner);
            }
        }
        Ok(())
    }

    fn define_parameters(&mut self, params: &[Param]) -> Result<(), ResolveError> {
        let table = self.symbols.locals_mut(&self.scope);
        for param in params {
            let ty = self.lattice.require(&param.ty)?;
            table
                .define_parameter(&param.name, ty)
                .map_err(|err| ResolveError::DuplicateDeclaration { name: err.name })?;
        }
        Ok(())
    }

    fn resolve_class(&mut self, class: &Class) -> Result<(), ResolveError> {
        let parent = class.parent.as_deref().unwrap_or(OBJ);
        if !self.lattice.contains(parent) {
            return Err(ResolveError::UnknownClass {
                name: parent.to_string(),
            });
        }
        if self.lattice.contains(&class.name) {
            return Err(ResolveError::DuplicateDeclaration {
                name: class.name.clone(),
            });
        }

        let class_ty = self.lattice.register(&class.name, Some(parent), vec![], vec![])?;
        self.classes.push(class.name.clone());
        tracing::debug!(class = %class.name, parent, "resolving class");

        let saved_scope = std::mem::replace(&mut self.scope, ScopeKey::constructor(&class.name));
        let saved_class = self.current_class.replace(class_ty);
        let result = self.resolve_class_members(class, class_ty);
        self.scope = saved_scope;
        self.current_class = saved_class;
        result
    }

    fn resolve_class_members(&mut self, class: &Class, class_ty: TypeId) -> Result<(), ResolveError> {
        self.define_parameters(&class.params)?;
        self.symbols.fields_mut(&class.name);
        self.resolve_block(&class.body)?;

        for function in &class.functions {
            self.resolve_function(class_ty, &class.name, function)?;
        }

        let properties: Vec<(String, TypeId)> = match self.symbols.fields(&class.name) {
            Some(table) => table
                .iter()
                .filter_map(|(name, symbol)| {
                    symbol
                        .joined_type(&self.lattice)
                        .map(|ty| (name.to_string(), ty))
                })
                .collect(),
            None => Vec::new(),
        };
        for (name, ty) in properties {
            self.lattice.set_property(class_ty, name, ty);
        }
        Ok(())
    }

    fn resolve_function(
        &mut self,
        class_ty: TypeId,
        class_name: &str,
        function: &Function,
    ) -> Result<(), ResolveError> {
        let mut method = Method::new(&function.name, &function.return_type);
        for param in &function.params {
            self.lattice.require(&param.ty)?;
            method = method.with_param(&param.name, &param.ty);
        }
        self.lattice.require(&function.return_type)?;
        self.lattice.add_method(class_ty, method)?;
        tracing::trace!(class = class_name, function = %function.name, "resolving method");

        let saved_scope = std::mem::replace(&mut self.scope, ScopeKey::new(class_name, &function.name));
        let result = self.resolve_function_body(function);
        self.scope = saved_scope;
        result
    }

    fn resolve_function_body(&mut self, function: &Function) -> Result<(), ResolveError> {
        self.define_parameters(&function.params)?;
        self.resolve_block(&function.body)?;
        if let Some(ret) = &function.ret {
            self.resolve_node(ret)?;
        }
        Ok(())
    }

    fn resolve_instance(&mut self, instance: &Instance) -> Result<TypeId, ResolveError> {
        let ty = self
            .lattice
            .lookup(&instance.class)
            .ok_or_else(|| ResolveError::UnknownClass {
                name: instance.class.clone(),
            })?;
        for arg in &instance.args {
            self.resolve_node(arg)?;
        }
        Ok(ty)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM_NAME)
    }
}
