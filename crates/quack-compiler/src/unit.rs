//! Compilation units
//!
//! A unit is the complete listing for one class:
//!
//! ```text
//! .class Dog:Obj
//! .field name
//!
//! .method $constructor
//! .args name
//!     enter
//!     ...
//! ```

use crate::instr::Instr;
use std::fmt;

/// One method of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodListing {
    pub name: String,
    /// Parameter names in declaration order
    pub args: Vec<String>,
    /// Non-parameter locals in first-assignment order
    pub locals: Vec<String>,
    pub code: Vec<Instr>,
}

impl MethodListing {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.code.iter().filter_map(|instr| match instr {
            Instr::Label(label) => Some(label.as_str()),
            _ => None,
        })
    }
}

/// Listing for one class, or for the top-level program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub name: String,
    pub parent: String,
    pub fields: Vec<String>,
    pub methods: Vec<MethodListing>,
}

impl CompilationUnit {
    /// Method by name
    pub fn method(&self, name: &str) -> Option<&MethodListing> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Every label defined anywhere in the unit
    pub fn labels(&self) -> Vec<&str> {
        self.methods.iter().flat_map(|m| m.labels()).collect()
    }

    /// Render the listing, optionally with `# Class.method` comment lines
    pub fn render(&self, emit_comments: bool) -> String {
        Listing {
            unit: self,
            emit_comments,
        }
        .to_string()
    }

    fn write_to(&self, out: &mut fmt::Formatter<'_>, emit_comments: bool) -> fmt::Result {
        writeln!(out, ".class {}:{}", self.name, self.parent)?;
        for field in &self.fields {
            writeln!(out, ".field {}", field)?;
        }

        for method in &self.methods {
            writeln!(out)?;
            if emit_comments {
                writeln!(out, "# {}.{}", self.name, method.name)?;
            }
            writeln!(out, ".method {}", method.name)?;
            if !method.args.is_empty() {
                writeln!(out, ".args {}", method.args.join(","))?;
            }
            if !method.locals.is_empty() {
                writeln!(out, ".local {}", method.locals.join(","))?;
            }
            for instr in &method.code {
                if instr.is_label() {
                    writeln!(out, "{}", instr)?;
                } else {
                    writeln!(out, "\t{}", instr)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, false)
    }
}

/// Display adapter carrying the comment option
struct Listing<'a> {
    unit: &'a CompilationUnit,
    emit_comments: bool,
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.unit.write_to(f, self.emit_comments)
    }
}

/// Helper for assembling a unit
pub struct UnitBuilder {
    name: String,
    parent: String,
    fields: Vec<String>,
    methods: Vec<MethodListing>,
}

impl UnitBuilder {
    pub fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn add_field(&mut self, field: impl Into<String>) {
        self.fields.push(field.into());
    }

    pub fn add_method(&mut self, method: MethodListing) {
        self.methods.push(method);
    }

    pub fn build(self) -> CompilationUnit {
        CompilationUnit {
            name: self.name,
            parent: self.parent,
            fields: self.fields,
            methods: self.methods,
        }
    }
}
