//! Built-in types
//!
//! `Obj`, `String`, `Int`, `Boolean` and `Nothing` exist in every lattice
//! before any user class is registered. Methods are re-declared on each
//! subtype, so `Int.print` resolves to `Int` rather than `Obj`.

use crate::ty::Method;

/// Root of the hierarchy
pub const OBJ: &str = "Obj";
/// String type
pub const STRING: &str = "String";
/// Integer type
pub const INT: &str = "Int";
/// Boolean type
pub const BOOLEAN: &str = "Boolean";
/// Type of `print` results and of absent return values
pub const NOTHING: &str = "Nothing";

fn string() -> Method {
    Method::new("string", STRING)
}

fn print() -> Method {
    Method::new("print", NOTHING)
}

fn equals() -> Method {
    Method::new("equals", BOOLEAN).with_param("other", OBJ)
}

fn less(operand: &str) -> Method {
    Method::new("less", BOOLEAN).with_param("other", operand)
}

fn int_op(name: &str) -> Method {
    Method::new(name, INT).with_param("other", INT)
}

/// Built-in types in registration order: (name, parent, methods)
pub fn definitions() -> Vec<(&'static str, Option<&'static str>, Vec<Method>)> {
    vec![
        (OBJ, None, vec![string(), print(), equals()]),
        (
            STRING,
            Some(OBJ),
            vec![
                string(),
                print(),
                equals(),
                less(STRING),
                Method::new("plus", STRING).with_param("other", STRING),
            ],
        ),
        (
            INT,
            Some(OBJ),
            vec![
                int_op("plus"),
                int_op("sub"),
                int_op("mult"),
                int_op("div"),
                less(INT),
                equals(),
                print(),
                string(),
            ],
        ),
        (BOOLEAN, Some(OBJ), vec![string(), print(), equals()]),
        (NOTHING, Some(OBJ), Vec::new()),
    ]
}
