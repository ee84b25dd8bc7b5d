//! Operator lowering
//!
//! Quack has no operator nodes. Tree builders turn `a + b` into
//! `a.plus(b)` and comparisons into `less`/`equals` calls through these
//! helpers, so every front end lowers the same way.

use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Infix operators of the surface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Times,
    /// `/`
    Divide,
    /// `<`
    Less,
    /// `==`
    Equals,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `and`
    And,
    /// `or`
    Or,
}

/// Prefix operators of the surface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-`
    Negate,
    /// `not`
    Not,
}

/// Lower `lhs op rhs`
///
/// `>` swaps its operands into a `less` call; `<=` and `>=` become an `or`
/// of a strict comparison and `equals`, so their operands appear twice.
pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    match op {
        BinaryOp::Plus => Node::call(lhs, "plus", vec![rhs]),
        BinaryOp::Minus => Node::call(lhs, "sub", vec![rhs]),
        BinaryOp::Times => Node::call(lhs, "mult", vec![rhs]),
        BinaryOp::Divide => Node::call(lhs, "div", vec![rhs]),
        BinaryOp::Less => Node::call(lhs, "less", vec![rhs]),
        BinaryOp::Equals => Node::call(lhs, "equals", vec![rhs]),
        BinaryOp::Greater => Node::call(rhs, "less", vec![lhs]),
        BinaryOp::LessEqual => {
            let strict = Node::call(lhs.clone(), "less", vec![rhs.clone()]);
            Node::or(strict, Node::call(lhs, "equals", vec![rhs]))
        }
        BinaryOp::GreaterEqual => {
            let strict = Node::call(rhs.clone(), "less", vec![lhs.clone()]);
            Node::or(strict, Node::call(lhs, "equals", vec![rhs]))
        }
        BinaryOp::And => Node::and(lhs, rhs),
        BinaryOp::Or => Node::or(lhs, rhs),
    }
}

/// Lower `op operand`
pub fn unary(op: UnaryOp, operand: Node) -> Node {
    match op {
        UnaryOp::Negate => Node::negate(operand),
        UnaryOp::Not => Node::not(operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MethodCall;

    fn as_call(node: &Node) -> &MethodCall {
        match node {
            Node::MethodCall(call) => call,
            other => panic!("expected method call, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_lowers_to_call() {
        let node = binary(BinaryOp::Minus, Node::number(5), Node::number(2));
        let call = as_call(&node);
        assert_eq!(call.method, "sub");
        assert_eq!(*call.receiver, Node::number(5));
        assert_eq!(call.args, vec![Node::number(2)]);
    }

    #[test]
    fn test_greater_swaps_operands() {
        let node = binary(BinaryOp::Greater, Node::var("a"), Node::var("b"));
        let call = as_call(&node);
        assert_eq!(call.method, "less");
        assert_eq!(*call.receiver, Node::var("b"));
        assert_eq!(call.args, vec![Node::var("a")]);
    }

    #[test]
    fn test_less_equal_is_or_of_less_and_equals() {
        let node = binary(BinaryOp::LessEqual, Node::var("a"), Node::var("b"));
        let Node::Or(or) = &node else {
            panic!("expected or, got {:?}", node);
        };
        assert_eq!(as_call(&or.left).method, "less");
        assert_eq!(as_call(&or.right).method, "equals");
    }

    #[test]
    fn test_greater_equal() {
        let node = binary(BinaryOp::GreaterEqual, Node::var("a"), Node::var("b"));
        let Node::Or(or) = &node else {
            panic!("expected or, got {:?}", node);
        };
        let strict = as_call(&or.left);
        assert_eq!(strict.method, "less");
        assert_eq!(*strict.receiver, Node::var("b"));
    }

    #[test]
    fn test_unary() {
        assert!(matches!(unary(UnaryOp::Negate, Node::number(1)), Node::Negate(_)));
        assert!(matches!(unary(UnaryOp::Not, Node::boolean(true)), Node::Not(_)));
    }

    #[test]
    fn test_logical_binary() {
        assert!(matches!(
            binary(BinaryOp::And, Node::boolean(true), Node::boolean(false)),
            Node::And(_)
        ));
    }
}
