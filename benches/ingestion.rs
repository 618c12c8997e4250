use criterion::{black_box, criterion_group, criterion_main, Criterion};

use csv_user_ingest::execution::{ExecutionEngine, ExecutionOptions};
use csv_user_ingest::ingestion::{read_records_from_str, tokenize};
use csv_user_ingest::processing::{normalize, NormalizeOptions};

fn synthetic_users(rows: usize) -> String {
    let mut out = String::from("name.firstName,name.lastName,age,address.line1,address.city,gender\n");
    for i in 0..rows {
        out.push_str(&format!(
            "First{i},\"Last, {i}\",{},\"{} Main St\",Pune,{}\n",
            i % 90 + 1,
            i,
            if i % 2 == 0 { "f" } else { "m" }
        ));
    }
    out
}

fn bench_tokenize(c: &mut Criterion) {
    let line = r#"Jane,"Doe, Jr.",42,"12 ""Quoted"" Lane",Pune,f"#;
    c.bench_function("tokenize_quoted_line", |b| b.iter(|| tokenize(black_box(line))));
}

fn bench_read_records(c: &mut Criterion) {
    let input = synthetic_users(10_000);
    c.bench_function("read_records_10k", |b| {
        b.iter(|| read_records_from_str(black_box(&input)).map(|(records, _)| records.len()))
    });
}

fn bench_normalize(c: &mut Criterion) {
    let input = synthetic_users(10_000);
    let Ok((records, _)) = read_records_from_str(&input) else {
        return;
    };
    let opts = NormalizeOptions::default();

    c.bench_function("normalize_sequential_10k", |b| {
        b.iter(|| records.iter().filter(|r| normalize(r, &opts).is_ok()).count())
    });

    if let Ok(engine) = ExecutionEngine::new(ExecutionOptions::default()) {
        c.bench_function("normalize_parallel_10k", |b| {
            b.iter(|| engine.normalize_parallel(black_box(&records), &opts).len())
        });
    }
}

criterion_group!(benches, bench_tokenize, bench_read_records, bench_normalize);
criterion_main!(benches);
