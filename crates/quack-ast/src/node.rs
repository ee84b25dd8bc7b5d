//! AST node definitions
//!
//! Nodes are built once and never restructured. The resolver annotates them
//! through side tables keyed by [`NodeId`], so the tree itself stays immutable.

use serde::{Deserialize, Serialize};

/// Receiver name that denotes the current instance
pub const SELF_NAME: &str = "this";

/// Identity of a node for the duration of one borrow of the tree
///
/// Derived from the node's address, so it is only meaningful while the tree
/// is neither moved nor mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A statement or expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Sequencing: `left` runs before `right`
    Program(Program),
    /// `if` / `elif` / `else` chain
    If(If),
    /// `while` loop
    Loop(Loop),
    /// Short-circuit `and`
    And(Binary),
    /// Short-circuit `or`
    Or(Binary),
    /// Boolean `not`
    Not(Unary),
    /// `receiver.method(args)`
    MethodCall(MethodCall),
    /// Arithmetic negation
    Negate(Unary),
    /// Integer literal
    Number(i64),
    /// String literal (text without quotes)
    StringLiteral(String),
    /// `true` / `false`
    BoolLiteral(bool),
    /// Read of a local variable
    VarRef(VarRef),
    /// Read of a field: `receiver.field`
    FieldRef(FieldAccess),
    /// Store into a variable or field
    Assignment(Assignment),
    /// Class declaration
    Class(Class),
    /// Object instantiation: `ClassName(args)`
    Instance(Instance),
}

impl Node {
    /// Identity of this node within the current tree
    pub fn id(&self) -> NodeId {
        NodeId(self as *const Node as usize)
    }

    /// Short name of the node kind, for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Program(_) => "program",
            Node::If(_) => "if",
            Node::Loop(_) => "loop",
            Node::And(_) => "and",
            Node::Or(_) => "or",
            Node::Not(_) => "not",
            Node::MethodCall(_) => "method_call",
            Node::Negate(_) => "negate",
            Node::Number(_) => "number",
            Node::StringLiteral(_) => "string",
            Node::BoolLiteral(_) => "bool",
            Node::VarRef(_) => "var_ref",
            Node::FieldRef(_) => "field_ref",
            Node::Assignment(_) => "assignment",
            Node::Class(_) => "class",
            Node::Instance(_) => "instance",
        }
    }

    /// Chain statements into nested [`Program`] nodes, preserving order
    ///
    /// Returns `None` for an empty list.
    pub fn sequence(statements: Vec<Node>) -> Option<Node> {
        let mut iter = statements.into_iter().rev();
        let mut acc = iter.next()?;
        for stmt in iter {
            acc = Node::Program(Program {
                left: Box::new(stmt),
                right: Box::new(acc),
            });
        }
        Some(acc)
    }

    /// Integer literal
    pub fn number(value: i64) -> Node {
        Node::Number(value)
    }

    /// String literal
    pub fn string(text: impl Into<String>) -> Node {
        Node::StringLiteral(text.into())
    }

    /// Boolean literal
    pub fn boolean(flag: bool) -> Node {
        Node::BoolLiteral(flag)
    }

    /// Variable read
    pub fn var(name: impl Into<String>) -> Node {
        Node::VarRef(VarRef { name: name.into() })
    }

    /// The current instance
    pub fn this() -> Node {
        Node::var(SELF_NAME)
    }

    /// Field read
    pub fn field(receiver: impl Into<String>, field: impl Into<String>) -> Node {
        Node::FieldRef(FieldAccess {
            receiver: receiver.into(),
            field: field.into(),
        })
    }

    /// Method call
    pub fn call(receiver: Node, method: impl Into<String>, args: Vec<Node>) -> Node {
        Node::MethodCall(MethodCall {
            receiver: Box::new(receiver),
            method: method.into(),
            args,
        })
    }

    /// `name = value`
    pub fn assign(name: impl Into<String>, value: Node) -> Node {
        Node::Assignment(Assignment {
            target: Target::Var(VarCreate {
                name: name.into(),
                declared_type: None,
            }),
            value: Box::new(value),
        })
    }

    /// `name: ty = value`
    pub fn assign_typed(name: impl Into<String>, ty: impl Into<String>, value: Node) -> Node {
        Node::Assignment(Assignment {
            target: Target::Var(VarCreate {
                name: name.into(),
                declared_type: Some(ty.into()),
            }),
            value: Box::new(value),
        })
    }

    /// `receiver.field = value`
    pub fn assign_field(
        receiver: impl Into<String>,
        field: impl Into<String>,
        value: Node,
    ) -> Node {
        Node::Assignment(Assignment {
            target: Target::Field(FieldAccess {
                receiver: receiver.into(),
                field: field.into(),
            }),
            value: Box::new(value),
        })
    }

    /// `left and right`
    pub fn and(left: Node, right: Node) -> Node {
        Node::And(Binary::new(left, right))
    }

    /// `left or right`
    pub fn or(left: Node, right: Node) -> Node {
        Node::Or(Binary::new(left, right))
    }

    /// `not operand`
    pub fn not(operand: Node) -> Node {
        Node::Not(Unary::new(operand))
    }

    /// `-operand`
    pub fn negate(operand: Node) -> Node {
        Node::Negate(Unary::new(operand))
    }

    /// `ClassName(args)`
    pub fn instance(class: impl Into<String>, args: Vec<Node>) -> Node {
        Node::Instance(Instance {
            class: class.into(),
            args,
        })
    }

    /// `while condition { block }`
    pub fn while_loop(condition: Node, block: Vec<Node>) -> Node {
        Node::Loop(Loop {
            condition: Box::new(condition),
            block,
        })
    }
}

/// Two statements in sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Runs first
    pub left: Box<Node>,
    /// Runs second
    pub right: Box<Node>,
}

/// `if` with optional `elif` chain and `else`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    /// Tested first
    pub condition: Box<Node>,
    /// Runs when `condition` holds
    pub block: Vec<Node>,
    /// First `elif` clause; later ones hang off it
    pub elif: Option<Box<Elif>>,
    /// Runs when no condition holds
    pub else_block: Option<Else>,
}

impl If {
    /// `if condition { block }` with no further clauses
    pub fn new(condition: Node, block: Vec<Node>) -> Self {
        Self {
            condition: Box::new(condition),
            block,
            elif: None,
            else_block: None,
        }
    }

    /// Append an `elif` clause after any existing ones
    pub fn elif(mut self, condition: Node, block: Vec<Node>) -> Self {
        let clause = Elif {
            condition: Box::new(condition),
            block,
            elif: None,
        };
        match self.elif.as_mut() {
            Some(first) => first.push(clause),
            None => self.elif = Some(Box::new(clause)),
        }
        self
    }

    /// Set the `else` block
    pub fn otherwise(mut self, block: Vec<Node>) -> Self {
        self.else_block = Some(Else { block });
        self
    }
}

impl From<If> for Node {
    fn from(value: If) -> Self {
        Node::If(value)
    }
}

/// `elif condition { block }`, possibly followed by another `elif`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elif {
    /// Tested when every earlier condition failed
    pub condition: Box<Node>,
    /// Runs when `condition` holds
    pub block: Vec<Node>,
    /// Next clause in the chain
    pub elif: Option<Box<Elif>>,
}

impl Elif {
    fn push(&mut self, clause: Elif) {
        match self.elif.as_mut() {
            Some(next) => next.push(clause),
            None => self.elif = Some(Box::new(clause)),
        }
    }
}

/// `else { block }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Else {
    /// Fallback statements
    pub block: Vec<Node>,
}

/// `while condition { block }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    /// Checked before every iteration
    pub condition: Box<Node>,
    /// Loop body
    pub block: Vec<Node>,
}

/// Operands of `and` / `or`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    /// Always evaluated
    pub left: Box<Node>,
    /// Evaluated only when `left` does not decide the result
    pub right: Box<Node>,
}

impl Binary {
    fn new(left: Node, right: Node) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Operand of `not` / negation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    /// The negated value
    pub operand: Box<Node>,
}

impl Unary {
    fn new(operand: Node) -> Self {
        Self {
            operand: Box::new(operand),
        }
    }
}

/// `receiver.method(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Object the method is looked up on
    pub receiver: Box<Node>,
    /// Method name
    pub method: String,
    /// Arguments in call order
    pub args: Vec<Node>,
}

/// Read of a variable, including `this`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarRef {
    /// Variable name
    pub name: String,
}

impl VarRef {
    /// Whether this names the current instance
    pub fn is_self(&self) -> bool {
        self.name == SELF_NAME
    }
}

/// `receiver.field`, used both for reads and as an assignment target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAccess {
    /// Variable holding the object
    pub receiver: String,
    /// Field name
    pub field: String,
}

impl FieldAccess {
    /// Whether the receiver is the current instance
    pub fn on_self(&self) -> bool {
        self.receiver == SELF_NAME
    }
}

/// Variable introduced (or re-assigned) by an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarCreate {
    /// Variable name
    pub name: String,
    /// Type written in the source, as in `x: Int = 3`
    pub declared_type: Option<String>,
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// Local variable
    Var(VarCreate),
    /// Field of an object
    Field(FieldAccess),
}

impl Target {
    /// Name of the variable or field being stored to
    pub fn name(&self) -> &str {
        match self {
            Target::Var(var) => &var.name,
            Target::Field(field) => &field.field,
        }
    }
}

/// `target = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Where the value is stored
    pub target: Target,
    /// Stored value
    pub value: Box<Node>,
}

/// Formal parameter: `name: Type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type name
    pub ty: String,
}

impl Param {
    /// `name: ty`
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Method declared inside a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Method name
    pub name: String,
    /// Formal parameters in order
    pub params: Vec<Param>,
    /// Declared return type name
    pub return_type: String,
    /// Statements before the `return`
    pub body: Vec<Node>,
    /// Expression of the trailing `return`, if any
    pub ret: Option<Box<Node>>,
}

impl Function {
    /// Method with an empty body and no return expression
    pub fn new(name: impl Into<String>, params: Vec<Param>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params,
            return_type: return_type.into(),
            body: Vec::new(),
            ret: None,
        }
    }

    /// Set the body statements
    pub fn body(mut self, body: Vec<Node>) -> Self {
        self.body = body;
        self
    }

    /// Set the trailing return expression
    pub fn returns(mut self, expr: Node) -> Self {
        self.ret = Some(Box::new(expr));
        self
    }
}

/// Class declaration
///
/// `body` holds the constructor statements; `params` are the constructor's
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Class name, also the type name
    pub name: String,
    /// Constructor parameters
    pub params: Vec<Param>,
    /// Declared parent; `None` means `Obj`
    pub parent: Option<String>,
    /// Constructor statements
    pub body: Vec<Node>,
    /// Methods in declaration order
    pub functions: Vec<Function>,
}

impl Class {
    /// Class extending `Obj` with no body or methods
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
            parent: None,
            body: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Set the parent class
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the constructor statements
    pub fn body(mut self, body: Vec<Node>) -> Self {
        self.body = body;
        self
    }

    /// Append a method
    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }
}

impl From<Class> for Node {
    fn from(value: Class) -> Self {
        Node::Class(value)
    }
}

/// `ClassName(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Class to instantiate
    pub class: String,
    /// Constructor arguments
    pub args: Vec<Node>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_preserves_order() {
        let program = Node::sequence(vec![Node::number(1), Node::number(2), Node::number(3)]).unwrap();
        let Node::Program(outer) = &program else {
            panic!("expected program, got {:?}", program);
        };
        assert_eq!(*outer.left, Node::number(1));
        let Node::Program(inner) = outer.right.as_ref() else {
            panic!("expected nested program");
        };
        assert_eq!(*inner.left, Node::number(2));
        assert_eq!(*inner.right, Node::number(3));
    }

    #[test]
    fn test_sequence_empty_and_single() {
        assert!(Node::sequence(vec![]).is_none());
        assert_eq!(Node::sequence(vec![Node::boolean(true)]), Some(Node::boolean(true)));
    }

    #[test]
    fn test_if_builder_chains_elifs() {
        let stmt = If::new(Node::boolean(true), vec![])
            .elif(Node::boolean(false), vec![Node::number(1)])
            .elif(Node::boolean(false), vec![Node::number(2)])
            .otherwise(vec![Node::number(3)]);

        let first = stmt.elif.as_ref().unwrap();
        assert_eq!(first.block, vec![Node::number(1)]);
        let second = first.elif.as_ref().unwrap();
        assert_eq!(second.block, vec![Node::number(2)]);
        assert!(second.elif.is_none());
        assert_eq!(stmt.else_block.unwrap().block, vec![Node::number(3)]);
    }

    #[test]
    fn test_node_ids_are_distinct() {
        let nodes = vec![Node::number(1), Node::number(1)];
        assert_ne!(nodes[0].id(), nodes[1].id());
        assert_eq!(nodes[0].id(), nodes[0].id());
    }

    #[test]
    fn test_self_receivers() {
        let Node::VarRef(var) = Node::this() else {
            panic!("expected var ref");
        };
        assert!(var.is_self());
        let Node::FieldRef(field) = Node::field("this", "x") else {
            panic!("expected field ref");
        };
        assert!(field.on_self());
    }

    #[test]
    fn test_json_round_trip_of_class() {
        let class: Node = Class::new("Pt", vec![Param::new("x", "Int")])
            .body(vec![Node::assign_field("this", "x", Node::var("x"))])
            .function(Function::new("getx", vec![], "Int").returns(Node::field("this", "x")))
            .into();

        let json = serde_json::to_string(&class).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, class);
    }
}
