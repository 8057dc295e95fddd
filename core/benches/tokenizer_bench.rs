use corpusvec_core::{Dictionary, DocumentVector, Tokenizer};
use criterion::{criterion_group, criterion_main, Criterion};

fn sample_text() -> String {
    let words = [
        "anggaran", "proyek", "jalan", "desa", "kepala", "dana", "laporan", "audit", "korupsi", "pejabat",
        "tender", "pengadaan", "kontrak", "daerah", "provinsi", "kabupaten",
    ];
    let mut text = String::new();
    for i in 0..20_000 {
        text.push_str(words[(i * 7 + i / 3) % words.len()]);
        text.push_str(if i % 11 == 0 { ". " } else { " " });
    }
    text
}

fn bench_tokenize(c: &mut Criterion) {
    let text = sample_text();
    let tokenizer = Tokenizer::default();
    c.bench_function("tokenize_stream", |b| b.iter(|| tokenizer.tokens(text.as_bytes()).count()));
    c.bench_function("tokenize_buffer", |b| b.iter(|| tokenizer.buffer_tokens(text.as_bytes()).count()));
}

fn bench_vectorize(c: &mut Criterion) {
    let text = sample_text();
    let tokenizer = Tokenizer::default();
    let mut dict = Dictionary::new("bench");
    dict.add_document(tokenizer.tokens(text.as_bytes()), None).unwrap();
    c.bench_function("populate_dictionary", |b| {
        b.iter(|| {
            let mut d = Dictionary::new("bench");
            d.add_document(tokenizer.tokens(text.as_bytes()), None).unwrap();
            d.term_count()
        })
    });
    c.bench_function("build_document_vector", |b| {
        b.iter(|| DocumentVector::from_buffer(text.as_bytes(), &dict, &tokenizer).unwrap().item_count())
    });
}

criterion_group!(benches, bench_tokenize, bench_vectorize);
criterion_main!(benches);
