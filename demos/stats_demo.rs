use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use robin_hash::HashTable;
use robin_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of the initial slots to fill.
    #[arg(short = 'l', long = "load", default_value_t = 0.9)]
    load: f64,

    /// Remove every other value after filling the table.
    #[arg(long)]
    remove_half: bool,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity);
    let initial_exponent = table.capacity_exponent();

    println!(
        "Actual capacity: {} (exponent {})",
        table.capacity(),
        initial_exponent
    );
    println!("Filling table with u64 values...");

    let num_values = (table.capacity() as f64 * args.load) as usize;
    let mut growth_events = 0;
    for i in 0..num_values {
        let value = i as u64;
        let hash = hash_u64(value);
        let exponent = table.capacity_exponent();

        match table.entry(hash, |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }

        if table.capacity_exponent() != exponent {
            growth_events += 1;
            println!(
                "  grew at value {}: exponent {} -> {}",
                value,
                exponent,
                table.capacity_exponent()
            );
        }
    }

    if args.remove_half {
        for value in (0..num_values as u64).step_by(2) {
            table.remove(hash_u64(value), |&v| v == value);
        }
        println!("Removed every other value");
    }

    println!("Inserted {} values into table", num_values);
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.print_probe_histogram();
    table.debug_stats().print();
    println!(
        "Displacement-triggered growth events: {} (exponent {} -> {})",
        growth_events,
        initial_exponent,
        table.capacity_exponent()
    );
}
