//! Stack-machine instructions
//!
//! Each variant renders to exactly one line of the textual instruction
//! format. Labels render as `name:` and sit at column zero; everything else
//! is indented by the unit renderer.

use std::fmt;

/// Operand of a `const` instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Int(i64),
    Str(String),
    Bool(bool),
    Nothing,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(n) => write!(f, "{}", n),
            Constant::Str(text) => write!(f, "\"{}\"", escape(text)),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Nothing => f.write_str("nothing"),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Name of the current instance in `load` and field operands
pub const SELF_OPERAND: &str = "$";

/// One emitted instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Const(Constant),
    Load(String),
    Store(String),
    /// `load_field <obj>:<field>`
    LoadField { obj: String, field: String },
    /// `store_field <obj>:<field>`
    StoreField { obj: String, field: String },
    /// `call <Type>:<method>`
    Call { ty: String, method: String },
    New(String),
    Jump(String),
    JumpIf(String),
    JumpIfNot(String),
    Roll(u32),
    Pop,
    Enter,
    Return(usize),
    Label(String),
}

impl Instr {
    pub fn call(ty: impl Into<String>, method: impl Into<String>) -> Self {
        Instr::Call {
            ty: ty.into(),
            method: method.into(),
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instr::Label(_))
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Const(c) => write!(f, "const {}", c),
            Instr::Load(name) => write!(f, "load {}", name),
            Instr::Store(name) => write!(f, "store {}", name),
            Instr::LoadField { obj, field } => write!(f, "load_field {}:{}", obj, field),
            Instr::StoreField { obj, field } => write!(f, "store_field {}:{}", obj, field),
            Instr::Call { ty, method } => write!(f, "call {}:{}", ty, method),
            Instr::New(class) => write!(f, "new {}", class),
            Instr::Jump(label) => write!(f, "jump {}", label),
            Instr::JumpIf(label) => write!(f, "jump_if {}", label),
            Instr::JumpIfNot(label) => write!(f, "jump_ifnot {}", label),
            Instr::Roll(n) => write!(f, "roll {}", n),
            Instr::Pop => f.write_str("pop"),
            Instr::Enter => f.write_str("enter"),
            Instr::Return(n) => write!(f, "return {}", n),
            Instr::Label(label) => write!(f, "{}:", label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics() {
        assert_eq!(Instr::Const(Constant::Int(3)).to_string(), "const 3");
        assert_eq!(Instr::Const(Constant::Bool(false)).to_string(), "const false");
        assert_eq!(Instr::Const(Constant::Nothing).to_string(), "const nothing");
        assert_eq!(Instr::call("Int", "plus").to_string(), "call Int:plus");
        assert_eq!(
            Instr::StoreField { obj: "$".into(), field: "name".into() }.to_string(),
            "store_field $:name"
        );
        assert_eq!(Instr::JumpIfNot("else_0".into()).to_string(), "jump_ifnot else_0");
        assert_eq!(Instr::Roll(1).to_string(), "roll 1");
        assert_eq!(Instr::Return(0).to_string(), "return 0");
        assert_eq!(Instr::Label("if_end_0".into()).to_string(), "if_end_0:");
    }

    #[test]
    fn test_string_constant_escapes() {
        assert_eq!(Constant::Str("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Constant::Str("a\"b\n".into()).to_string(), "\"a\\\"b\\n\"");
    }

    #[test]
    fn test_is_label() {
        assert!(Instr::Label("x".into()).is_label());
        assert!(!Instr::Jump("x".into()).is_label());
    }
}
