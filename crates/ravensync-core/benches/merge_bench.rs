//! Benchmarks for ravensync merge operations
//!
//! Run with: cargo bench -p ravensync-core
//!
//! These establish baselines for the two merge policies and for contact
//! derivation, which run on every incoming batch.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ravensync_core::{derive_contacts, merge_append, merge_replace, DirectMessage, Profile};

fn profile(n: usize) -> Profile {
    Profile {
        creator: format!("{:064x}", n),
        name: format!("user {}", n),
        about: String::new(),
        picture: String::new(),
        created: n as i64,
    }
}

fn dm(n: usize, peer: usize) -> DirectMessage {
    DirectMessage {
        id: format!("{:064x}", n),
        peer: format!("{:064x}", peer),
        creator: "me".to_string(),
        content: "hello".to_string(),
        created: n as i64,
    }
}

fn bench_merge_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_append");

    for size in [100usize, 1_000, 10_000] {
        let current: Vec<DirectMessage> = (0..size).map(|n| dm(n, n % 50)).collect();
        // Half duplicates, half new.
        let batch: Vec<DirectMessage> =
            (size - 50..size + 50).map(|n| dm(n, n % 50)).collect();

        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(merge_append(&current, &batch)))
        });
    }

    group.finish();
}

fn bench_merge_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_replace");

    for size in [100usize, 1_000, 10_000] {
        let current: Vec<Profile> = (0..size).map(profile).collect();
        let batch: Vec<Profile> = (0..100).map(profile).collect();

        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(merge_replace(&current, &batch, "me")))
        });
    }

    group.finish();
}

fn bench_derive_contacts(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_contacts");

    for size in [100usize, 1_000, 10_000] {
        let messages: Vec<DirectMessage> = (0..size).map(|n| dm(n, n % 50)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(derive_contacts(&messages)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_merge_append,
    bench_merge_replace,
    bench_derive_contacts
);
criterion_main!(benches);
