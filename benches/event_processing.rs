use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skein::assert_eq_event;

const IN1: &str = r#"
- name: Mark McGwire
  stats: [65, 0.278]
- name: Sammy Sosa
  stats: [63, 0.288]
"#;

const IN1_EXPECTED: &str = r#"
 +DOC
  +SEQ
   +MAP
    =VAL :name
    =VAL :Mark McGwire
    =VAL :stats
    +SEQ []
     =VAL :65
     =VAL :0.278
    -SEQ
   -MAP
   +MAP
    =VAL :name
    =VAL :Sammy Sosa
    =VAL :stats
    +SEQ []
     =VAL :63
     =VAL :0.288
    -SEQ
   -MAP
  -SEQ
 -DOC"#;

fn bench_event_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench-yaml");
    group.significance_level(0.1).sample_size(50);
    group.bench_function("bench_yaml_events", |b| {
        b.iter(|| assert_eq_event(black_box(IN1), black_box(IN1_EXPECTED)))
    });
    group.finish();
}

criterion_group!(benches, bench_event_iter);
criterion_main!(benches);
