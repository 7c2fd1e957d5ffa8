use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use cursor_framework::{Cursor, MatchOptions, Pattern};

// --- Token Definition ---
#[derive(Debug, Clone, PartialEq)]
enum BenchToken {
    Number(i64),
    Identifier(String),
    Operator(char),
    Unknown(char),
}

fn generate_input(lines: usize) -> String {
    let mut input = String::new();
    for i in 0..lines {
        input.push_str(&format!("let value_{i} = {i} * (风 + 😀) - 42;\n"));
    }
    input
}

// Tokenizes with string patterns through the cursor's pattern cache.
fn tokenize_cached(input: &str) -> Vec<BenchToken> {
    let mut cursor = Cursor::new(input);
    let mut tokens = Vec::new();
    while cursor.has_remaining() {
        if cursor.match_pattern(r"\s+", "").unwrap_or(None).is_some() {
            continue;
        }
        if let Ok(Some(m)) = cursor.match_pattern("[0-9]+", "") {
            tokens.push(BenchToken::Number(m.as_str().parse().unwrap_or(0)));
            continue;
        }
        if let Ok(Some(m)) = cursor.match_pattern(r"[\p{Alphabetic}_][\w]*", "") {
            tokens.push(BenchToken::Identifier(m.as_str().to_string()));
            continue;
        }
        match cursor.consume(1) {
            Some(s) if "+-*/=()".contains(&*s) => {
                tokens.push(BenchToken::Operator(s.chars().next().unwrap_or('?')))
            }
            Some(s) => tokens.push(BenchToken::Unknown(s.chars().next().unwrap_or('?'))),
            None => break,
        }
    }
    tokens
}

// Same tokenizer with patterns compiled once up front.
fn tokenize_compiled(input: &str, patterns: &[Pattern; 3]) -> usize {
    let [whitespace, number, ident] = patterns;
    let mut cursor = Cursor::new(input);
    let mut count = 0;
    while cursor.has_remaining() {
        let options = MatchOptions::default();
        if cursor.match_compiled(whitespace, options).is_some() {
            continue;
        }
        count += 1;
        if cursor.match_compiled(number, options).is_some()
            || cursor.match_compiled(ident, options).is_some()
        {
            continue;
        }
        cursor.consume(1);
    }
    count
}

fn bench_tokenize(c: &mut Criterion) {
    let input = generate_input(1_000);
    let patterns = [
        Pattern::parse(r"\s+", "").expect("valid pattern"),
        Pattern::parse("[0-9]+", "").expect("valid pattern"),
        Pattern::parse(r"[\p{Alphabetic}_][\w]*", "").expect("valid pattern"),
    ];

    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("cached_patterns", |b| {
        b.iter(|| tokenize_cached(black_box(&input)))
    });
    group.bench_function("compiled_patterns", |b| {
        b.iter(|| tokenize_compiled(black_box(&input), &patterns))
    });
    group.finish();
}

fn bench_peek_while(c: &mut Criterion) {
    let input = "x".repeat(10_000);
    c.bench_function("peek_while_chars", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(input.as_str()));
            cursor.peek_while(|s| s == "x").len()
        })
    });
}

fn bench_save_cancel(c: &mut Criterion) {
    let input = generate_input(100);
    c.bench_function("save_consume_cancel", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(input.as_str()));
            for _ in 0..100 {
                cursor.save();
                cursor.consume(10);
                cursor.consume(10);
                cursor.cancel();
                cursor.consume(1);
            }
            cursor.remaining_length()
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_peek_while, bench_save_cancel);
criterion_main!(benches);
