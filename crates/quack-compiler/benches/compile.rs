use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quack_ast::lower::{binary, BinaryOp};
use quack_ast::{Class, Function, If, Node, Param};
use quack_compiler::Compiler;

/// `classes` small classes plus a top-level loop that uses each of them
fn synthetic_program(classes: usize) -> Vec<Node> {
    let mut stmts = Vec::with_capacity(classes + 2);
    for i in 0..classes {
        let class: Node = Class::new(format!("C{}", i), vec![Param::new("v", "Int")])
            .body(vec![Node::assign_field("this", "v", Node::var("v"))])
            .function(
                Function::new("step", vec![Param::new("n", "Int")], "Int").returns(binary(
                    BinaryOp::Plus,
                    Node::field("this", "v"),
                    Node::var("n"),
                )),
            )
            .into();
        stmts.push(class);
    }

    let mut body = Vec::with_capacity(classes);
    for i in 0..classes {
        let obj = Node::instance(format!("C{}", i), vec![Node::var("i")]);
        let step = Node::call(obj, "step", vec![Node::number(i as i64)]);
        body.push(
            If::new(
                binary(BinaryOp::GreaterEqual, step, Node::number(10)),
                vec![Node::assign("i", binary(BinaryOp::Minus, Node::var("i"), Node::number(1)))],
            )
            .otherwise(vec![Node::assign("i", binary(BinaryOp::Plus, Node::var("i"), Node::number(2)))])
            .into(),
        );
    }

    stmts.push(Node::assign("i", Node::number(0)));
    stmts.push(Node::while_loop(
        binary(BinaryOp::Less, Node::var("i"), Node::number(100)),
        body,
    ));
    stmts
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let compiler = Compiler::default();

    for classes in [1usize, 10, 100] {
        let program = synthetic_program(classes);
        group.throughput(Throughput::Elements(classes as u64));
        group.bench_with_input(BenchmarkId::new("classes", classes), &program, |b, program| {
            b.iter(|| compiler.compile_statements(black_box(program)).unwrap());
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let program = synthetic_program(50);
    let compiler = Compiler::default();
    c.bench_function("compile_to_text_50", |b| {
        b.iter(|| compiler.compile_to_text(black_box(&program)).unwrap());
    });
}

criterion_group!(benches, bench_compile, bench_render);
criterion_main!(benches);
