use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use edit_command::{Command, FileRef, Fragment, Snapshot, TextPatch, TextRange, compose, record};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} let value = compute(input, {i}); // edit-command benchmark line\n"
        ));
    }
    out.pop();
    out
}

/// Random sorted, non-touching single-character replacements over a text of `len` chars.
fn random_fragments(rng: &mut StdRng, len: usize, count: usize) -> Vec<Fragment> {
    let mut offsets: Vec<usize> = (0..count).map(|_| rng.gen_range(0..len)).collect();
    offsets.sort_unstable();
    offsets.dedup_by(|b, a| *b <= *a + 1);
    offsets.into_iter().map(|offset| Fragment::new(offset, 1, 1)).collect()
}

fn bench_compose(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let first = random_fragments(&mut rng, 1_000_000, 5_000);
    let second = random_fragments(&mut rng, 1_000_000, 5_000);
    c.bench_function("compose/5k_x_5k", |b| {
        b.iter(|| black_box(compose(black_box(&first), black_box(&second))))
    });
}

fn bench_translate_offset(c: &mut Criterion) {
    let text = large_text(10_000);
    let mut rng = StdRng::seed_from_u64(11);
    let len = text.chars().count();
    let fragments = random_fragments(&mut rng, len, 1_000);
    let mut chars: Vec<char> = text.chars().collect();
    for fragment in &fragments {
        chars[fragment.offset] = '#';
    }
    let new_text: String = chars.into_iter().collect();
    let patch = TextPatch::new(text, new_text, fragments).unwrap();

    c.bench_function("translate_offset/1k_fragments", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for offset in (0..len).step_by(997) {
                acc += patch.translate_offset(black_box(offset), true);
            }
            black_box(acc)
        })
    });
}

fn bench_merge_sequential_updates(c: &mut Criterion) {
    let file = FileRef::new("bench.rs");
    let text = large_text(5_000);
    c.bench_function("merge_adjacent/50_updates", |b| {
        b.iter_batched(
            || {
                let mut current = text.clone();
                let mut command = Command::nop();
                for i in 0..50 {
                    let next = current.replacen("compute", &format!("step{i}"), 1);
                    command = command.and_then(Command::replace_text(file.clone(), current, next.clone()));
                    current = next;
                }
                command
            },
            |command| black_box(command.merge_adjacent()),
            BatchSize::LargeInput,
        )
    });
}

fn bench_record_many_edits(c: &mut Criterion) {
    let file = FileRef::new("bench.rs");
    let snapshot = Snapshot::from_files([(file.clone(), large_text(5_000))]);
    c.bench_function("record/200_replacements", |b| {
        b.iter(|| {
            let command = record(&snapshot, |recorder| {
                let doc = recorder.writable(&file)?;
                for i in 0..200 {
                    let start = i * 70;
                    doc.replace(TextRange::new(start, start + 6), "######")?;
                }
                Ok(())
            });
            black_box(command)
        })
    });
}

criterion_group!(
    benches,
    bench_compose,
    bench_translate_offset,
    bench_merge_sequential_updates,
    bench_record_many_edits
);
criterion_main!(benches);
