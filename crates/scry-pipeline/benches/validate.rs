use criterion::{criterion_group, criterion_main, Criterion};
use scry_pipeline::{
    Capability, CapabilitySet, Command, CommandDescriptor, OptKind, OptSpec, OptionSchema,
    Pipeline, Registry,
};

struct Noop;
impl Command for Noop {}

fn registry() -> Registry {
    let mut reg = Registry::new();
    reg.register(CommandDescriptor {
        names: &["scan", "s"],
        input_type: None,
        output_type: Some("entry_t"),
        summary: "Scan all entries",
        description: "",
        options: OptionSchema {
            flags: &[OptSpec {
                long: "limit",
                short: Some('n'),
                kind: OptKind::Int,
                help: "stop after this many entries",
            }],
            positional: None,
        },
        capabilities: CapabilitySet::new().with(Capability::Produce),
        build: Box::new(|_| Box::new(Noop)),
    })
    .expect("scan");
    reg.register(CommandDescriptor {
        names: &["keep"],
        input_type: Some("entry_t"),
        output_type: Some("entry_t"),
        summary: "Keep matching entries",
        description: "",
        options: OptionSchema {
            flags: &[OptSpec {
                long: "object",
                short: Some('o'),
                kind: OptKind::Int,
                help: "keep entries of this object",
            }],
            positional: None,
        },
        capabilities: CapabilitySet::new().with(Capability::Transform),
        build: Box::new(|_| Box::new(Noop)),
    })
    .expect("keep");
    reg
}

fn bench_parse(c: &mut Criterion) {
    let reg = registry();
    c.bench_function("parse_two_stage_line", |b| {
        b.iter(|| {
            let pipeline =
                Pipeline::parse(&reg, "scan --limit 64 | keep -o 5").expect("valid line");
            std::hint::black_box(pipeline.stages().len())
        });
    });
    c.bench_function("reject_unknown_command", |b| {
        b.iter(|| std::hint::black_box(Pipeline::parse(&reg, "scan | nope").is_err()));
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
