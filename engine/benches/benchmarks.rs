//! Performance benchmarks for shelf-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shelf_engine::{Book, BookEdit, Library, RecordStore, Status};

fn seed(count: u64) -> Vec<Book> {
    (0..count)
        .map(|i| Book::new(format!("book_{}", i), "Title", "Author").with_version(i % 7))
        .collect()
}

fn bench_store_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_operations");

    group.bench_function("initialize_1000", |b| {
        let books = seed(1000);
        b.iter(|| {
            let mut store = RecordStore::new();
            store.initialize(black_box(books.clone()));
            store
        })
    });

    group.bench_function("attempt_save_accepted", |b| {
        let mut store = RecordStore::new();
        store.initialize(seed(1000));
        b.iter(|| {
            let version = store.version_of("book_42").unwrap_or_default();
            let book = Book::new("book_42", "Title", "Author").with_version(version);
            store.attempt_save(black_box(&book), black_box(version))
        })
    });

    group.bench_function("attempt_save_conflict", |b| {
        let mut store = RecordStore::new();
        store.initialize(vec![Book::new("b1", "Title", "Author").with_version(100)]);
        let stale = Book::new("b1", "Title", "Author").with_version(1);
        b.iter(|| store.attempt_save(black_box(&stale), black_box(1)))
    });

    group.finish();
}

fn bench_library_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("library_operations");

    for size in [10u64, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("begin_save_undo", size), &size, |b, &size| {
            let mut library = Library::default();
            library.load(seed(size));
            let id = format!("book_{}", size - 1);
            let edit = BookEdit::new().status(Status::Reading).notes("bench");
            b.iter(|| {
                library.begin_save(black_box(&id), &edit, 1000).ok();
                library.undo(&id, 1000)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_store_operations, bench_library_operations);
criterion_main!(benches);
