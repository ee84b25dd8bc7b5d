//! End-to-end compilation scenarios
//!
//! Each test builds a tree the way a front end would (operators lowered
//! through `quack_ast::lower`) and checks the rendered listings.

use quack_ast::lower::{binary, BinaryOp};
use quack_ast::{Class, Function, If, Node, Param};
use quack_compiler::{CompileError, CompileOptions, Compiler, Instr};
use quack_checker::ResolveError;
use std::collections::HashSet;

fn compile(stmts: &[Node]) -> quack_compiler::Output {
    Compiler::default()
        .compile_statements(stmts)
        .expect("program should compile")
}

fn program_text(stmts: &[Node]) -> String {
    compile(stmts).program.to_string()
}

#[test]
fn test_typed_assignment_of_sum() {
    // x: Int = 3 + 4;
    let stmts = vec![Node::assign_typed(
        "x",
        "Int",
        binary(BinaryOp::Plus, Node::number(3), Node::number(4)),
    )];

    let resolution = Compiler::default().resolve(&stmts).unwrap();
    let scope = quack_checker::ScopeKey::constructor("Main");
    let x = resolution.variable_type(&scope, "x").unwrap();
    assert_eq!(resolution.lattice().name(x), "Int");

    let expected = "\
.class Main:Obj

.method $constructor
.local x
\tenter
\tconst 3
\tconst 4
\troll 1
\tcall Int:plus
\tstore x
\tconst nothing
\treturn 0
";
    assert_eq!(program_text(&stmts), expected);
}

#[test]
fn test_unknown_method_aborts_compilation() {
    // x: Int = 3; x.frobnicate();
    let stmts = vec![
        Node::assign_typed("x", "Int", Node::number(3)),
        Node::call(Node::var("x"), "frobnicate", vec![]),
    ];

    let err = Compiler::default().compile_statements(&stmts).unwrap_err();
    match err {
        CompileError::Resolve(ResolveError::UnknownMethod { method, ty }) => {
            assert_eq!(method, "frobnicate");
            assert_eq!(ty, "Int");
        }
        other => panic!("expected UnknownMethod, got {:?}", other),
    }
}

#[test]
fn test_if_else_labels() {
    // if (1 < 2) { "yes".print(); } else { "no".print(); }
    let stmt: Node = If::new(
        binary(BinaryOp::Less, Node::number(1), Node::number(2)),
        vec![Node::call(Node::string("yes"), "print", vec![])],
    )
    .otherwise(vec![Node::call(Node::string("no"), "print", vec![])])
    .into();

    let output = compile(&[stmt]);
    let code: Vec<String> = output.program.methods[0]
        .code
        .iter()
        .map(|i| i.to_string())
        .collect();

    assert_eq!(
        code,
        vec![
            "enter",
            "const 1",
            "const 2",
            "roll 1",
            "call Int:less",
            "jump_ifnot else_start_0",
            "const \"yes\"",
            "call String:print",
            "pop",
            "jump if_end_0",
            "else_start_0:",
            "const \"no\"",
            "call String:print",
            "pop",
            "if_end_0:",
            "const nothing",
            "return 0",
        ]
    );
    assert_eq!(output.program.labels(), vec!["else_start_0", "if_end_0"]);
}

#[test]
fn test_class_unit() {
    // class Dog(name: String) extends Obj {
    //     this.name = name;
    //     def speak(): String { return this.name + " says woof"; }
    // }
    let dog: Node = Class::new("Dog", vec![Param::new("name", "String")])
        .extends("Obj")
        .body(vec![Node::assign_field("this", "name", Node::var("name"))])
        .function(Function::new("speak", vec![], "String").returns(binary(
            BinaryOp::Plus,
            Node::field("this", "name"),
            Node::string(" says woof"),
        )))
        .into();

    let output = compile(&[dog]);
    assert_eq!(output.classes.len(), 1);

    let expected = "\
.class Dog:Obj
.field name

.method $constructor
.args name
\tenter
\tload name
\tload $
\tstore_field $:name
\tload $
\treturn 1

.method speak
\tenter
\tload $
\tload_field $:name
\tconst \" says woof\"
\troll 1
\tcall String:plus
\treturn 0
";
    assert_eq!(output.classes[0].to_string(), expected);
}

#[test]
fn test_constructor_parameter_is_not_a_field() {
    let dog: Node = Class::new("Dog", vec![Param::new("name", "String")]).into();
    let output = compile(&[dog]);
    let unit = output.unit("Dog").unwrap();
    assert!(unit.fields.is_empty());
    assert_eq!(unit.method("$constructor").unwrap().args, vec!["name"]);
}

#[test]
fn test_top_level_field_store_declares_program_field() {
    // this.count = 1; this.count.print();
    let stmts = vec![
        Node::assign_field("this", "count", Node::number(1)),
        Node::call(Node::field("this", "count"), "print", vec![]),
    ];
    let output = compile(&stmts);
    assert_eq!(output.program.fields, vec!["count"]);

    let text = output.program.to_string();
    assert!(text.starts_with(".class Main:Obj\n.field count\n\n.method $constructor\n"));
    assert!(text.contains("\tload $\n\tstore_field $:count\n"));
    assert!(text.contains("\tload $\n\tload_field $:count\n"));
}

#[test]
fn test_while_loop() {
    // a: Int = 1; while (a < 10) { a = a.plus(1); }
    let stmts = vec![
        Node::assign_typed("a", "Int", Node::number(1)),
        Node::while_loop(
            binary(BinaryOp::Less, Node::var("a"), Node::number(10)),
            vec![Node::assign(
                "a",
                Node::call(Node::var("a"), "plus", vec![Node::number(1)]),
            )],
        ),
    ];

    let expected = "\
.class Main:Obj

.method $constructor
.local a
\tenter
\tconst 1
\tstore a
\tjump while_check_0
while_start_0:
\tload a
\tconst 1
\troll 1
\tcall Int:plus
\tstore a
while_check_0:
\tload a
\tconst 10
\troll 1
\tcall Int:less
\tjump_if while_start_0
\tconst nothing
\treturn 0
";
    assert_eq!(program_text(&stmts), expected);
}

fn busy_program() -> Vec<Node> {
    let cond = |n: i64| binary(BinaryOp::LessEqual, Node::var("i"), Node::number(n));
    let shape: Node = Class::new("Shape", vec![Param::new("sides", "Int")])
        .body(vec![Node::assign_field("this", "sides", Node::var("sides"))])
        .function(
            Function::new("big", vec![], "Boolean").returns(Node::and(
                binary(BinaryOp::Greater, Node::field("this", "sides"), Node::number(4)),
                Node::not(Node::boolean(false)),
            )),
        )
        .into();

    vec![
        shape,
        Node::assign("i", Node::number(0)),
        Node::while_loop(
            cond(10),
            vec![
                If::new(cond(3), vec![Node::call(Node::var("i"), "print", vec![])])
                    .elif(cond(6), vec![Node::assign("s", Node::instance("Shape", vec![Node::var("i")]))])
                    .otherwise(vec![Node::call(Node::string("big"), "print", vec![])])
                    .into(),
                If::new(
                    Node::or(cond(1), Node::not(cond(2))),
                    vec![Node::assign("i", binary(BinaryOp::Times, Node::var("i"), Node::number(2)))],
                )
                .into(),
                Node::assign("i", binary(BinaryOp::Plus, Node::var("i"), Node::number(1))),
            ],
        ),
    ]
}

#[test]
fn test_labels_are_unique_per_unit() {
    let output = compile(&busy_program());
    for unit in output.units() {
        let labels = unit.labels();
        let distinct: HashSet<&str> = labels.iter().copied().collect();
        assert_eq!(distinct.len(), labels.len(), "duplicate label in {}", unit.name);
    }
    assert!(output.program.labels().len() > 10);
}

#[test]
fn test_every_jump_targets_a_label_in_its_method() {
    let output = compile(&busy_program());
    for unit in output.units() {
        for method in &unit.methods {
            let defined: HashSet<&str> = method.labels().collect();
            for instr in &method.code {
                if let Instr::Jump(target) | Instr::JumpIf(target) | Instr::JumpIfNot(target) = instr {
                    assert!(
                        defined.contains(target.as_str()),
                        "{}.{} jumps to undefined {}",
                        unit.name,
                        method.name,
                        target
                    );
                }
            }
        }
    }
}

#[test]
fn test_recompiling_is_deterministic() {
    let stmts = busy_program();
    let compiler = Compiler::new(CompileOptions::default().with_comments(true));
    let first = compiler.compile_to_text(&stmts).unwrap();
    let second = compiler.compile_to_text(&stmts).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(first[0].1.contains("# Shape.big\n"));
}

#[test]
fn test_subclass_calls_inherited_method_through_owner() {
    let animal: Node = Class::new("Animal", vec![])
        .function(Function::new("speak", vec![], "String").returns(Node::string("...")))
        .into();
    let dog: Node = Class::new("Dog", vec![]).extends("Animal").into();
    let stmts = vec![
        animal,
        dog,
        Node::assign("d", Node::instance("Dog", vec![])),
        Node::call(Node::call(Node::var("d"), "speak", vec![]), "print", vec![]),
    ];

    let text = program_text(&stmts);
    assert!(text.contains("\tload d\n\tcall Animal:speak\n\tcall String:print\n\tpop\n"));
}

#[test]
fn test_local_declarations_exclude_parameters() {
    let calc: Node = Class::new("Calc", vec![])
        .function(
            Function::new("twice", vec![Param::new("n", "Int")], "Int")
                .body(vec![Node::assign(
                    "r",
                    binary(BinaryOp::Times, Node::var("n"), Node::number(2)),
                )])
                .returns(Node::var("r")),
        )
        .into();

    let output = compile(&[calc]);
    let method = output.unit("Calc").unwrap().method("twice").unwrap();
    assert_eq!(method.args, vec!["n"]);
    assert_eq!(method.locals, vec!["r"]);
    assert_eq!(method.code.last(), Some(&Instr::Return(1)));
}
