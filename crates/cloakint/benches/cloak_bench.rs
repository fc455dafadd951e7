use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use cloak_aes::{expand_key, Aes128Key, Engine};
use cloakint::CloakedU64;

fn bench_engines(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
    let mut key = [0u8; 16];
    let mut block = [0u8; 16];
    rng.fill_bytes(&mut key);
    rng.fill_bytes(&mut block);
    let round_keys = expand_key(&Aes128Key::from(key));

    let mut group = c.benchmark_group("engine");
    let mut engines = vec![Engine::software()];
    engines.extend(Engine::hardware());
    for engine in engines {
        group.bench_function(format!("{}_encrypt", engine.name()), |b| {
            b.iter(|| engine.encrypt_block(black_box(&block), &round_keys));
        });
        group.bench_function(format!("{}_decrypt", engine.name()), |b| {
            b.iter(|| engine.decrypt_block(black_box(&block), &round_keys));
        });
    }
    group.finish();
}

fn bench_values(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
    let a = CloakedU64::new(rng.next_u64());
    let b = CloakedU64::new(rng.next_u64() | 1);

    let mut group = c.benchmark_group("cloaked");
    group.bench_function("new", |bench| {
        bench.iter(|| CloakedU64::new(black_box(42)));
    });
    group.bench_function("get", |bench| {
        bench.iter(|| a.get());
    });
    group.bench_function("add", |bench| {
        bench.iter(|| &a + &b);
    });
    group.bench_function("div", |bench| {
        bench.iter(|| &a / &b);
    });
    group.finish();
}

criterion_group!(benches, bench_engines, bench_values);
criterion_main!(benches);
