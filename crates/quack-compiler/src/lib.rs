//! Quack Compiler - resolved AST to stack-machine listings
//!
//! Runs the resolution pass over a whole program, then renders one
//! [`CompilationUnit`] per class plus one for the top-level program.

pub mod codegen;
pub mod error;
pub mod instr;
pub mod labels;
pub mod options;
pub mod unit;

pub use codegen::{CodeGenerator, ROLL_METHODS};
pub use error::{CompileError, CompileResult};
pub use instr::{Constant, Instr};
pub use labels::{LabelAllocator, LabelKind};
pub use options::CompileOptions;
pub use unit::{CompilationUnit, MethodListing, UnitBuilder};

use quack_ast::{Class, Node};
use quack_checker::{Resolution, Resolver};
use rustc_hash::FxHashMap;

/// Main compiler entry point
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

/// Every unit of one compiled program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// User classes in registration order
    pub classes: Vec<CompilationUnit>,
    /// The top-level program
    pub program: CompilationUnit,
}

impl Output {
    /// All units, classes first
    pub fn units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.classes.iter().chain(std::iter::once(&self.program))
    }

    /// Unit by class name
    pub fn unit(&self, name: &str) -> Option<&CompilationUnit> {
        self.units().find(|unit| unit.name == name)
    }
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Resolve a program without generating code
    pub fn resolve(&self, statements: &[Node]) -> CompileResult<Resolution> {
        Ok(Resolver::new(&self.options.unit_name).resolve_program(statements)?)
    }

    /// Compile a single root node
    pub fn compile(&self, root: &Node) -> CompileResult<Output> {
        self.compile_statements(std::slice::from_ref(root))
    }

    /// Compile top-level statements
    ///
    /// Resolution covers the whole program before any code is generated, and
    /// nothing is generated if it fails.
    #[tracing::instrument(skip_all, fields(unit = %self.options.unit_name))]
    pub fn compile_statements(&self, statements: &[Node]) -> CompileResult<Output> {
        let resolution = self.resolve(statements)?;
        let mut gen = CodeGenerator::new(&resolution);

        // Units follow registration order, so a parent precedes its children.
        let declarations = collect_classes(statements);
        let mut classes = Vec::with_capacity(resolution.classes().len());
        for name in resolution.classes() {
            let class = declarations
                .get(name.as_str())
                .ok_or_else(|| CompileError::unresolved("class", "declaration"))?;
            classes.push(gen.class_unit(class)?);
        }
        let program = gen.program_unit(statements)?;

        tracing::debug!(units = classes.len() + 1, "compilation complete");
        Ok(Output { classes, program })
    }

    /// Compile and render every unit as `(class name, listing)`
    pub fn compile_to_text(&self, statements: &[Node]) -> CompileResult<Vec<(String, String)>> {
        let output = self.compile_statements(statements)?;
        Ok(output
            .units()
            .map(|unit| (unit.name.clone(), unit.render(self.options.emit_comments)))
            .collect())
    }
}

/// Every class declaration in the tree, by name
fn collect_classes(statements: &[Node]) -> FxHashMap<&str, &Class> {
    let mut classes = FxHashMap::default();
    walk_block(statements, &mut classes);
    classes
}

fn walk_block<'a>(block: &'a [Node], classes: &mut FxHashMap<&'a str, &'a Class>) {
    for stmt in block {
        walk_classes(stmt, classes);
    }
}

fn walk_classes<'a>(node: &'a Node, classes: &mut FxHashMap<&'a str, &'a Class>) {
    match node {
        Node::Program(program) => {
            walk_classes(&program.left, classes);
            walk_classes(&program.right, classes);
        }
        Node::Class(class) => {
            classes.insert(class.name.as_str(), class);
            walk_block(&class.body, classes);
            for function in &class.functions {
                walk_block(&function.body, classes);
                if let Some(ret) = &function.ret {
                    walk_classes(ret, classes);
                }
            }
        }
        Node::If(stmt) => {
            walk_classes(&stmt.condition, classes);
            walk_block(&stmt.block, classes);
            let mut elif = stmt.elif.as_deref();
            while let Some(clause) = elif {
                walk_classes(&clause.condition, classes);
                walk_block(&clause.block, classes);
                elif = clause.elif.as_deref();
            }
            if let Some(else_block) = &stmt.else_block {
                walk_block(&else_block.block, classes);
            }
        }
        Node::Loop(stmt) => {
            walk_classes(&stmt.condition, classes);
            walk_block(&stmt.block, classes);
        }
        Node::And(binary) | Node::Or(binary) => {
            walk_classes(&binary.left, classes);
            walk_classes(&binary.right, classes);
        }
        Node::Not(unary) | Node::Negate(unary) => walk_classes(&unary.operand, classes),
        Node::MethodCall(call) => {
            walk_classes(&call.receiver, classes);
            walk_block(&call.args, classes);
        }
        Node::Assignment(assignment) => walk_classes(&assignment.value, classes),
        Node::Instance(instance) => walk_block(&instance.args, classes),
        Node::Number(_)
        | Node::StringLiteral(_)
        | Node::BoolLiteral(_)
        | Node::VarRef(_)
        | Node::FieldRef(_) => {}
    }
}
