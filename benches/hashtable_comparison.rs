use alloc::format;
use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use robin_hash::HashTable as RobinHashTable;
use robin_hash::hash_table::Entry as RobinEntry;
use siphasher::sip::SipHasher;

extern crate alloc;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for TestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn random_items<T: KeyValuePair>(count: usize) -> Vec<(u64, T)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let item = T::new(rng.try_next_u64().unwrap());
            (item.hash_key(), item)
        })
        .collect()
}

fn robin_insert<T: KeyValuePair>(table: &mut RobinHashTable<T>, hash: u64, item: T) {
    match table.entry(hash, |v| v.eq_key(&item)) {
        RobinEntry::Vacant(entry) => {
            black_box(entry.insert(item));
        }
        RobinEntry::Occupied(_) => {}
    }
}

fn hashbrown_insert<T: KeyValuePair>(table: &mut HashbrownHashTable<T>, hash: u64, item: T) {
    match table.entry(hash, |v: &T| v.eq_key(&item), |v| v.hash_key()) {
        HashbrownEntry::Vacant(entry) => {
            black_box(entry.insert(item));
        }
        HashbrownEntry::Occupied(_) => {}
    }
}

fn bench_insert_random<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<T>(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = RobinHashTable::new();
                    for (hash, item) in hash_and_item {
                        robin_insert(&mut table, hash, item);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = HashbrownHashTable::new();
                    for (hash, item) in hash_and_item {
                        hashbrown_insert(&mut table, hash, item);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let present = random_items::<T>(*size);
        let absent = random_items::<T>(*size);

        let mut robin = RobinHashTable::new();
        let mut brown = HashbrownHashTable::new();
        for (hash, item) in present.iter().cloned() {
            robin_insert(&mut robin, hash, item.clone());
            hashbrown_insert(&mut brown, hash, item);
        }

        let mut probes: Vec<(u64, T)> = present.iter().chain(absent.iter()).cloned().collect();
        probes.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in probes.iter() {
                    black_box(robin.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in probes.iter() {
                    black_box(brown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<T>(*size);
        let mut robin = RobinHashTable::new();
        let mut brown = HashbrownHashTable::new();
        for (hash, item) in hash_and_item.iter().cloned() {
            robin_insert(&mut robin, hash, item.clone());
            hashbrown_insert(&mut brown, hash, item);
        }

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter_batched(
                || robin.clone(),
                |mut table| {
                    for (hash, item) in hash_and_item.iter() {
                        black_box(table.remove(*hash, |v| v.eq_key(item)));
                    }
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || brown.clone(),
                |mut table| {
                    for (hash, item) in hash_and_item.iter() {
                        if let Ok(entry) = table.find_entry(*hash, |v| v.eq_key(item)) {
                            black_box(entry.remove());
                        }
                    }
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_churn<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let resident = random_items::<T>(*size);
        let incoming = random_items::<T>(*size);

        let mut robin = RobinHashTable::new();
        let mut brown = HashbrownHashTable::new();
        for (hash, item) in resident.iter().cloned() {
            robin_insert(&mut robin, hash, item.clone());
            hashbrown_insert(&mut brown, hash, item);
        }

        // Each step retires one resident and admits one newcomer, keeping the
        // population constant while exercising backward-shift removal.
        group.throughput(Throughput::Elements(2 * *size as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter_batched(
                || robin.clone(),
                |mut table| {
                    for ((old_hash, old), (new_hash, new)) in resident.iter().zip(incoming.iter()) {
                        black_box(table.remove(*old_hash, |v| v.eq_key(old)));
                        robin_insert(&mut table, *new_hash, new.clone());
                    }
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || brown.clone(),
                |mut table| {
                    for ((old_hash, old), (new_hash, new)) in resident.iter().zip(incoming.iter()) {
                        if let Ok(entry) = table.find_entry(*old_hash, |v| v.eq_key(old)) {
                            black_box(entry.remove());
                        }
                        hashbrown_insert(&mut table, *new_hash, new.clone());
                    }
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_mixed_zipf<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("mixed_zipf_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let universe = random_items::<T>(*size * 2);
        let zipf = Zipf::new(universe.len() as f64, 1.1).unwrap();
        let mut rng = SmallRng::from_os_rng();

        // 80% lookups, 15% inserts, 5% removals over a skewed key popularity.
        let ops: Vec<(u8, usize)> = (0..*size)
            .map(|_| {
                let index = rng.sample(zipf) as usize - 1;
                (rng.random_range(0..100u8), index)
            })
            .collect();

        group.throughput(Throughput::Elements(ops.len() as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut table = RobinHashTable::new();
                    for (hash, item) in universe[..*size].iter().cloned() {
                        robin_insert(&mut table, hash, item);
                    }
                    table
                },
                |mut table| {
                    for &(op, index) in ops.iter() {
                        let (hash, item) = &universe[index];
                        match op {
                            0..80 => {
                                black_box(table.find(*hash, |v| v.eq_key(item)));
                            }
                            80..95 => robin_insert(&mut table, *hash, item.clone()),
                            _ => {
                                black_box(table.remove(*hash, |v| v.eq_key(item)));
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut table = HashbrownHashTable::new();
                    for (hash, item) in universe[..*size].iter().cloned() {
                        hashbrown_insert(&mut table, hash, item);
                    }
                    table
                },
                |mut table| {
                    for &(op, index) in ops.iter() {
                        let (hash, item) = &universe[index];
                        match op {
                            0..80 => {
                                black_box(table.find(*hash, |v| v.eq_key(item)));
                            }
                            80..95 => hashbrown_insert(&mut table, *hash, item.clone()),
                            _ => {
                                if let Ok(entry) = table.find_entry(*hash, |v| v.eq_key(item)) {
                                    black_box(entry.remove());
                                }
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 4>,
    bench_insert_random::<TestItem, 3>,
    bench_find_hit_miss::<SmallTestItem, 4>,
    bench_find_hit_miss::<TestItem, 3>,
    bench_remove::<SmallTestItem, 4>,
    bench_churn::<SmallTestItem, 4>,
    bench_churn::<TestItem, 3>,
    bench_mixed_zipf::<SmallTestItem, 4>,
    bench_mixed_zipf::<TestItem, 3>,
);

criterion_main!(benches);
