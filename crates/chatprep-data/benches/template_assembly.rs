//! Benchmarks for conversation-to-token assembly.
//!
//! Run with: cargo bench -p chatprep-data

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chatprep_data::{openchat, openchat_v2, MessageProps, Turn};

/// Build a deterministic multi-turn conversation.
fn generate_turns(num_turns: usize) -> Vec<Turn> {
    (0..num_turns)
        .map(|i| {
            if i % 2 == 0 {
                Turn::human(format!("question {i} about something moderately long"))
            } else {
                Turn::gpt(format!("answer {i} with a few more words of content"))
            }
        })
        .collect()
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for num_turns in [2usize, 8, 32].iter() {
        let turns = generate_turns(*num_turns);
        let config = openchat();

        group.throughput(Throughput::Elements(*num_turns as u64));
        group.bench_with_input(BenchmarkId::new("table_prefix", num_turns), &turns, |b, turns| {
            b.iter(|| {
                config
                    .render(
                        |text: &str| Ok(text.bytes().map(u32::from).collect()),
                        |_token: &str| Ok(0u32),
                        black_box(turns),
                        None,
                    )
                    .unwrap()
            });
        });

        let v2 = openchat_v2();
        let props = MessageProps::new(true);
        group.bench_with_input(
            BenchmarkId::new("conditional_prefix", num_turns),
            &turns,
            |b, turns| {
                b.iter(|| {
                    v2.render(
                        |text: &str| Ok(text.bytes().map(u32::from).collect()),
                        |_token: &str| Ok(0u32),
                        black_box(turns),
                        Some(&props),
                    )
                    .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
