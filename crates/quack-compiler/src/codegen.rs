//! Code generation pass
//!
//! Renders a resolved tree to stack-machine instructions. Generation only
//! reads the [`Resolution`]; every static fact it needs (call targets,
//! field receiver classes, scope locals) was settled by the resolver.

use crate::error::{CompileError, CompileResult};
use crate::instr::{Constant, Instr, SELF_OPERAND};
use crate::labels::{LabelAllocator, LabelKind};
use crate::unit::{CompilationUnit, MethodListing, UnitBuilder};
use quack_ast::*;
use quack_checker::{Resolution, ScopeKey, CONSTRUCTOR};
use quack_types::builtins::{INT, OBJ};

/// Methods whose two operands are swapped with `roll 1` before the call
pub const ROLL_METHODS: [&str; 4] = ["sub", "div", "less", "plus"];

/// Method whose `Nothing` result is discarded
const PRINT: &str = "print";

/// Generator for one compilation
///
/// Labels are unique across every unit produced by one generator.
pub struct CodeGenerator<'r> {
    resolution: &'r Resolution,
    labels: LabelAllocator,
}

impl<'r> CodeGenerator<'r> {
    pub fn new(resolution: &'r Resolution) -> Self {
        Self {
            resolution,
            labels: LabelAllocator::new(),
        }
    }

    /// Unit for the top-level program
    ///
    /// Top-level statements form the program's constructor, followed by the
    /// fixed `const nothing` / `return 0` trailer.
    pub fn program_unit(&mut self, statements: &[Node]) -> CompileResult<CompilationUnit> {
        let name = self.resolution.program_name().to_string();
        let scope = ScopeKey::constructor(&name);

        let mut code = vec![Instr::Enter];
        self.gen_block(statements, &mut code)?;
        code.push(Instr::Const(Constant::Nothing));
        code.push(Instr::Return(0));

        let mut builder = UnitBuilder::new(&name, OBJ);
        self.add_fields(&name, &mut builder);
        builder.add_method(MethodListing {
            name: CONSTRUCTOR.to_string(),
            args: Vec::new(),
            locals: self.locals(&scope),
            code,
        });
        Ok(builder.build())
    }

    /// Unit for a user class
    pub fn class_unit(&mut self, class: &Class) -> CompileResult<CompilationUnit> {
        tracing::debug!(class = %class.name, functions = class.functions.len(), "generating class");

        let parent = class.parent.as_deref().unwrap_or(OBJ);
        let mut builder = UnitBuilder::new(&class.name, parent);
        self.add_fields(&class.name, &mut builder);

        let mut code = vec![Instr::Enter];
        self.gen_block(&class.body, &mut code)?;
        code.push(Instr::Load(SELF_OPERAND.to_string()));
        code.push(Instr::Return(class.params.len()));

        builder.add_method(MethodListing {
            name: CONSTRUCTOR.to_string(),
            args: class.params.iter().map(|p| p.name.clone()).collect(),
            locals: self.locals(&ScopeKey::constructor(&class.name)),
            code,
        });

        for function in &class.functions {
            let method = self.gen_function(&class.name, function)?;
            builder.add_method(method);
        }
        Ok(builder.build())
    }

    fn gen_function(&mut self, class: &str, function: &Function) -> CompileResult<MethodListing> {
        let mut code = vec![Instr::Enter];
        self.gen_block(&function.body, &mut code)?;
        match &function.ret {
            Some(ret) => self.gen_node(ret, &mut code)?,
            None => code.push(Instr::Const(Constant::Nothing)),
        }
        code.push(Instr::Return(function.params.len()));

        Ok(MethodListing {
            name: function.name.clone(),
            args: function.params.iter().map(|p| p.name.clone()).collect(),
            locals: self.locals(&ScopeKey::new(class, &function.name)),
            code,
        })
    }

    /// `.field` entries: every field stored on an instance of `class`
    fn add_fields(&self, class: &str, builder: &mut UnitBuilder) {
        if let Some(fields) = self.resolution.symbols().fields(class) {
            for (field, _) in fields.iter() {
                builder.add_field(field);
            }
        }
    }

    fn locals(&self, scope: &ScopeKey) -> Vec<String> {
        self.resolution
            .symbols()
            .locals(scope)
            .map(|table| table.locals().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn gen_block(&mut self, block: &[Node], out: &mut Vec<Instr>) -> CompileResult<()> {
        for stmt in block {
            self.gen_node(stmt, out)?;
        }
        Ok(())
    }

    /// Emit the code for one node
    pub fn gen_node(&mut self, node: &Node, out: &mut Vec<Instr>) -> CompileResult<()> {
        match node {
            Node::Program(program) => {
                self.gen_node(&program.left, out)?;
                self.gen_node(&program.right, out)?;
            }
            Node::If(stmt) => self.gen_if(stmt, out)?,
            Node::Loop(stmt) => self.gen_loop(stmt, out)?,
            Node::And(binary) => self.gen_and(binary, out)?,
            Node::Or(binary) => self.gen_or(binary, out)?,
            Node::Not(unary) => self.gen_not(unary, out)?,
            Node::MethodCall(call) => self.gen_call(node, call, out)?,
            Node::Negate(unary) => {
                out.push(Instr::Const(Constant::Int(0)));
                self.gen_node(&unary.operand, out)?;
                out.push(Instr::call(INT, "sub"));
            }
            Node::Number(n) => out.push(Instr::Const(Constant::Int(*n))),
            Node::StringLiteral(text) => out.push(Instr::Const(Constant::Str(text.clone()))),
            Node::BoolLiteral(b) => out.push(Instr::Const(Constant::Bool(*b))),
            Node::VarRef(var) => {
                let name = if var.is_self() { SELF_OPERAND } else { var.name.as_str() };
                out.push(Instr::Load(name.to_string()));
            }
            Node::FieldRef(field) => {
                let obj = self.field_operand(node, field)?;
                out.push(Instr::Load(receiver_operand(field)));
                out.push(Instr::LoadField {
                    obj,
                    field: field.field.clone(),
                });
            }
            Node::Assignment(assign) => {
                self.gen_node(&assign.value, out)?;
                match &assign.target {
                    Target::Var(var) => out.push(Instr::Store(var.name.clone())),
                    Target::Field(field) => {
                        let obj = self.field_operand(node, field)?;
                        out.push(Instr::Load(receiver_operand(field)));
                        out.push(Instr::StoreField {
                            obj,
                            field: field.field.clone(),
                        });
                    }
                }
            }
            // Classes get their own unit.
            Node::Class(_) => {}
            Node::Instance(instance) => {
                self.gen_block(&instance.args, out)?;
                out.push(Instr::New(instance.class.clone()));
                out.push(Instr::call(&instance.class, CONSTRUCTOR));
            }
        }
        Ok(())
    }

    fn field_operand(&self, node: &Node, field: &FieldAccess) -> CompileResult<String> {
        if field.on_self() {
            return Ok(SELF_OPERAND.to_string());
        }
        let owner = self
            .resolution
            .receiver_type(node)
            .ok_or_else(|| CompileError::unresolved(node.kind_name(), "receiver type"))?;
        Ok(self.resolution.lattice().name(owner).to_string())
    }

    fn gen_call(&mut self, node: &Node, call: &MethodCall, out: &mut Vec<Instr>) -> CompileResult<()> {
        let owner = self
            .resolution
            .call_target(node)
            .ok_or_else(|| CompileError::unresolved(node.kind_name(), "call target"))?;

        self.gen_node(&call.receiver, out)?;
        self.gen_block(&call.args, out)?;
        if ROLL_METHODS.contains(&call.method.as_str()) {
            out.push(Instr::Roll(1));
        }
        out.push(Instr::call(self.resolution.lattice().name(owner), &call.method));
        if call.method == PRINT {
            out.push(Instr::Pop);
        }
        Ok(())
    }

    /// Label of the clause after the current one, if any
    fn next_clause(&mut self, elif: Option<&Elif>, has_else: bool) -> Option<String> {
        if elif.is_some() {
            Some(self.labels.next(LabelKind::Elif).name("start"))
        } else if has_else {
            Some(self.labels.next(LabelKind::Else).name("start"))
        } else {
            None
        }
    }

    fn gen_if(&mut self, stmt: &If, out: &mut Vec<Instr>) -> CompileResult<()> {
        let end = self.labels.next(LabelKind::If).name("end");
        let has_else = stmt.else_block.is_some();

        let mut next = self.next_clause(stmt.elif.as_deref(), has_else);
        self.gen_node(&stmt.condition, out)?;
        out.push(Instr::JumpIfNot(next.clone().unwrap_or_else(|| end.clone())));
        self.gen_block(&stmt.block, out)?;
        out.push(Instr::Jump(end.clone()));

        let mut elif = stmt.elif.as_deref();
        while let Some(clause) = elif {
            if let Some(label) = next.take() {
                out.push(Instr::Label(label));
            }
            next = self.next_clause(clause.elif.as_deref(), has_else);
            self.gen_node(&clause.condition, out)?;
            out.push(Instr::JumpIfNot(next.clone().unwrap_or_else(|| end.clone())));
            self.gen_block(&clause.block, out)?;
            out.push(Instr::Jump(end.clone()));
            elif = clause.elif.as_deref();
        }

        if let Some(else_block) = &stmt.else_block {
            if let Some(label) = next.take() {
                out.push(Instr::Label(label));
            }
            self.gen_block(&else_block.block, out)?;
        }

        out.push(Instr::Label(end));
        Ok(())
    }

    fn gen_loop(&mut self, stmt: &Loop, out: &mut Vec<Instr>) -> CompileResult<()> {
        let group = self.labels.next(LabelKind::While);
        let start = group.name("start");
        let check = group.name("check");

        out.push(Instr::Jump(check.clone()));
        out.push(Instr::Label(start.clone()));
        self.gen_block(&stmt.block, out)?;
        out.push(Instr::Label(check));
        self.gen_node(&stmt.condition, out)?;
        out.push(Instr::JumpIf(start));
        Ok(())
    }

    fn gen_and(&mut self, binary: &Binary, out: &mut Vec<Instr>) -> CompileResult<()> {
        let group = self.labels.next(LabelKind::And);
        let (mid, end) = (group.name("mid"), group.name("end"));

        self.gen_node(&binary.left, out)?;
        out.push(Instr::JumpIfNot(mid.clone()));
        self.gen_node(&binary.right, out)?;
        out.push(Instr::Jump(end.clone()));
        out.push(Instr::Label(mid));
        out.push(Instr::Const(Constant::Bool(false)));
        out.push(Instr::Label(end));
        Ok(())
    }

    fn gen_or(&mut self, binary: &Binary, out: &mut Vec<Instr>) -> CompileResult<()> {
        let group = self.labels.next(LabelKind::Or);
        let (mid, end) = (group.name("mid"), group.name("end"));

        self.gen_node(&binary.left, out)?;
        out.push(Instr::JumpIf(mid.clone()));
        self.gen_node(&binary.right, out)?;
        out.push(Instr::Jump(end.clone()));
        out.push(Instr::Label(mid));
        out.push(Instr::Const(Constant::Bool(true)));
        out.push(Instr::Label(end));
        Ok(())
    }

    fn gen_not(&mut self, unary: &Unary, out: &mut Vec<Instr>) -> CompileResult<()> {
        let group = self.labels.next(LabelKind::Not);
        let (mid, end) = (group.name("mid"), group.name("end"));

        self.gen_node(&unary.operand, out)?;
        out.push(Instr::JumpIf(mid.clone()));
        out.push(Instr::Const(Constant::Bool(true)));
        out.push(Instr::Jump(end.clone()));
        out.push(Instr::Label(mid));
        out.push(Instr::Const(Constant::Bool(false)));
        out.push(Instr::Label(end));
        Ok(())
    }
}

/// Operand of the `load` that pushes a field's receiver
fn receiver_operand(field: &FieldAccess) -> String {
    if field.on_self() {
        SELF_OPERAND.to_string()
    } else {
        field.receiver.clone()
    }
}
