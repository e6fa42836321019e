//! A Robin Hood hash table keyed by caller-supplied hashes.
//!
//! [`HashTable<V>`] stores values of type `V` in a single contiguous array of
//! slots and resolves collisions with linear probing and Robin Hood
//! displacement. Like `hashbrown::HashTable`, it never hashes anything itself:
//! every operation takes the 64-bit hash of the value and an equality
//! predicate.
//!
//! ## Layout
//!
//! A table with capacity exponent `n` has `2^n + n` slots. The home slot of a
//! hash is its top `n` bits, so the first `2^n` slots are directly
//! addressable and the trailing `n` slots are slack for probe runs that start
//! near the end of the home range. Probing wraps around at the end of the
//! array.
//!
//! No entry ever sits more than `2n` slots past its home slot. An insertion
//! that would break this bound grows the table instead.
//!
//! ## Hash quality
//!
//! Only the most significant bits pick the home slot. A hash whose entropy
//! lives in the low bits (the identity hash on small integers, for instance)
//! maps every key to the same home slot and forces the table to grow until it
//! runs out of memory. Use a hasher with good dispersion across its high bits.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;

use crate::error::Fallibility;
use crate::error::TryReserveError;
use crate::error::infallible;

/// Capacity exponent of the first allocation made by a table that was
/// created without an explicit capacity.
pub const DEFAULT_CAPACITY_EXPONENT: u32 = 6;

/// Largest capacity exponent a table can grow to.
pub const MAX_CAPACITY_EXPONENT: u32 = usize::BITS - 1;

#[inline(always)]
fn displacement_limit(log_n: u32) -> usize {
    2 * log_n as usize
}

#[inline(always)]
fn bucket_count(log_n: u32) -> usize {
    if log_n == 0 {
        0
    } else {
        (1usize << log_n) + displacement_limit(log_n) / 2
    }
}

#[inline(always)]
fn home_slot(hash: u64, log_n: u32) -> usize {
    debug_assert!(log_n > 0 && log_n <= MAX_CAPACITY_EXPONENT);
    (hash >> (u64::BITS - log_n)) as usize
}

/// Forward distance from `from` to `to` in an array of `len` slots.
#[inline(always)]
fn distance(from: usize, to: usize, len: usize) -> usize {
    if to >= from { to - from } else { to + len - from }
}

/// Smallest capacity exponent whose bucket count is at least `min_buckets`.
fn exponent_for(min_buckets: usize) -> Option<u32> {
    (1..=MAX_CAPACITY_EXPONENT).find(|&log_n| bucket_count(log_n) >= min_buckets)
}

fn slot_layout<V>(log_n: u32, fallibility: Fallibility) -> Result<Layout, TryReserveError> {
    Layout::array::<Slot<V>>(bucket_count(log_n)).map_err(|_| fallibility.capacity_overflow())
}

fn try_zeroed_vec<T: Clone + Default>(
    len: usize,
    layout: Layout,
    fallibility: Fallibility,
) -> Result<Vec<T>, TryReserveError> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| fallibility.alloc_err(layout))?;
    vec.resize(len, T::default());
    Ok(vec)
}

#[derive(Clone)]
enum Slot<V> {
    Empty,
    Occupied { hash: u64, value: V },
}

impl<V> Slot<V> {
    #[inline(always)]
    fn hash(&self) -> Option<u64> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { hash, .. } => Some(*hash),
        }
    }

    #[inline(always)]
    fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline(always)]
    fn into_value(self) -> Option<V> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { value, .. } => Some(value),
        }
    }
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Current capacity exponent
    pub capacity_exponent: u32,
    /// Total number of slots allocated
    pub total_slots: usize,
    /// Number of slots currently occupied
    pub occupied_slots: usize,
    /// Largest displacement of any entry
    pub max_displacement: usize,
    /// Largest displacement the table tolerates before growing
    pub displacement_limit: usize,
    /// Mean displacement over all entries
    pub mean_displacement: f64,
    /// Slot utilization (occupied_slots / total_slots)
    pub load_factor: f64,
    /// Total memory in bytes used by the slot array
    pub total_bytes: usize,
    /// Memory in bytes held by empty slots
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load factor)",
            self.populated,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Capacity exponent: {} (displacement limit {})",
            self.capacity_exponent, self.displacement_limit
        );
        println!(
            "Displacement: max {}, mean {:.3}",
            self.max_displacement, self.mean_displacement
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// A hash table using Robin Hood linear probing.
///
/// `HashTable<V>` stores values of type `V` and provides insertion, lookup,
/// and removal operations. Unlike standard hash maps, this implementation
/// requires you to provide both the hash value and an equality predicate for
/// each operation. The hash is cached next to the value and reused whenever
/// the table grows, so values are never rehashed.
///
/// ## Performance Characteristics
///
/// - **Lookups** probe at most `2n + 1` slots, where `n` is the capacity
///   exponent.
/// - **Memory**: the size of `V` plus a u64 for the hash plus the enum tag
///   per slot.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     robin_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     robin_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).unwrap().name, "Alice");
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Box<[Slot<V>]>,
    log_n: u32,
    populated: usize,
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        if self.slots.is_empty() {
            return f
                .debug_struct("HashTable")
                .field("displacements", &"unallocated")
                .field("populated", &self.populated)
                .field("capacity_exponent", &self.log_n)
                .finish();
        }

        f.debug_struct("HashTable")
            .field(
                "displacements",
                &self
                    .slots
                    .chunks(16)
                    .enumerate()
                    .map(|(chunk, slots)| {
                        let mut items = Vec::new();
                        for (offset, slot) in slots.iter().enumerate() {
                            match slot.hash() {
                                Some(hash) => items.push(format!(
                                    "{:02}",
                                    self.displacement(chunk * 16 + offset, hash)
                                )),
                                None => items.push("..".to_string()),
                            }
                        }
                        items.join(", ")
                    })
                    .collect::<Vec<String>>(),
            )
            .field("populated", &self.populated)
            .field("capacity_exponent", &self.log_n)
            .field("displacement_limit", &self.displacement_limit())
            .finish()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty hash table.
    ///
    /// No memory is allocated until the first insertion, which allocates
    /// `2^6 + 6` slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            slots: Box::default(),
            log_n: 0,
            populated: 0,
        }
    }

    /// Creates a new hash table with at least the specified number of slots.
    ///
    /// The actual capacity is the smallest bucket count `2^n + n` that is not
    /// below `capacity`. A capacity of zero does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts on allocation failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// assert_eq!(table.capacity_exponent(), 7);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = Self::new();
        table.rehash(capacity);
        table
    }

    /// Returns the number of elements in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// assert_eq!(table.len(), 0);
    ///
    /// table.entry(hash_u64(1), |&n: &u64| n == 1).or_insert(1);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the table.
    ///
    /// This is an upper bound on the number of elements the table can hold
    /// without reallocating. The table may grow earlier, when an insertion
    /// would push an entry past the displacement limit.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the capacity exponent `n`, or zero if nothing is allocated.
    ///
    /// The table has `2^n + n` slots and tolerates a displacement of at most
    /// `2n`. The exponent never decreases except through [`reset`].
    ///
    /// [`reset`]: HashTable::reset
    pub fn capacity_exponent(&self) -> u32 {
        self.log_n
    }

    /// Returns the largest distance an entry may sit from its home slot at
    /// the current capacity.
    pub fn displacement_limit(&self) -> usize {
        displacement_limit(self.log_n)
    }

    /// Returns the largest distance of any entry from its home slot.
    ///
    /// This scans every slot.
    pub fn max_displacement(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.hash().map(|hash| self.displacement(index, hash)))
            .max()
            .unwrap_or(0)
    }

    /// Removes all elements from the table.
    ///
    /// This operation preserves the table's allocated capacity and capacity
    /// exponent. Use [`reset`] to also release the storage.
    ///
    /// [`reset`]: HashTable::reset
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(hash_u64(1), |&n: &u64| n == 1).or_insert(1);
    /// table.entry(hash_u64(2), |&n: &u64| n == 2).or_insert(2);
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        if self.populated > 0 {
            self.slots.fill_with(|| Slot::Empty);
        }
        self.populated = 0;
    }

    /// Removes all elements and releases the table's storage.
    ///
    /// The table returns to the unallocated state of [`HashTable::new`]; the
    /// next insertion allocates at the default capacity exponent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(1000);
    /// table.entry(7, |&v| v == 7).or_insert(7);
    ///
    /// table.reset();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 0);
    /// assert_eq!(table.capacity_exponent(), 0);
    /// ```
    pub fn reset(&mut self) {
        if !self.slots.is_empty() {
            log::debug!(
                "releasing hash table storage: capacity exponent {}, {} entries",
                self.log_n,
                self.populated
            );
        }
        self.slots = Box::default();
        self.log_n = 0;
        self.populated = 0;
    }

    /// Grows the table to at least `min_buckets` slots.
    ///
    /// The new capacity exponent is the smallest one whose bucket count is at
    /// least `min_buckets`. Every entry is moved to the new array; values are
    /// not rehashed. This never shrinks the table.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts on allocation failure.
    /// See [`try_rehash`] for a fallible version.
    ///
    /// [`try_rehash`]: HashTable::try_rehash
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<i32> = HashTable::new();
    /// table.rehash(500);
    /// assert!(table.capacity() >= 500);
    ///
    /// // Smaller requests are ignored.
    /// table.rehash(10);
    /// assert!(table.capacity() >= 500);
    /// ```
    pub fn rehash(&mut self, min_buckets: usize) {
        infallible(self.rehash_inner(min_buckets, Fallibility::Infallible));
    }

    /// Tries to grow the table to at least `min_buckets` slots.
    ///
    /// On error the table is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::TryReserveError;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<i32> = HashTable::new();
    /// assert_eq!(table.try_rehash(64), Ok(()));
    /// assert_eq!(
    ///     table.try_rehash(usize::MAX),
    ///     Err(TryReserveError::CapacityOverflow)
    /// );
    /// assert!(table.capacity() >= 64);
    /// ```
    pub fn try_rehash(&mut self, min_buckets: usize) -> Result<(), TryReserveError> {
        self.rehash_inner(min_buckets, Fallibility::Fallible)
    }

    /// Reserves room for at least `additional` more elements.
    ///
    /// After calling `reserve`, the table has at least `self.len() +
    /// additional` slots. Inserting that many elements can still grow the
    /// table if their hashes cluster.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<i32> = HashTable::new();
    /// table.reserve(50);
    /// assert!(table.capacity() >= 50);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.reserve_inner(additional, Fallibility::Infallible));
    }

    /// Tries to reserve room for at least `additional` more elements.
    ///
    /// On error the table is left unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.reserve_inner(additional, Fallibility::Fallible)
    }

    fn reserve_inner(
        &mut self,
        additional: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let required = self
            .populated
            .checked_add(additional)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        self.rehash_inner(required, fallibility)
    }

    fn rehash_inner(
        &mut self,
        min_buckets: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        if min_buckets <= self.slots.len() {
            return Ok(());
        }

        let log_n = exponent_for(min_buckets).ok_or_else(|| fallibility.capacity_overflow())?;
        debug_assert!(log_n > self.log_n);
        self.resize(log_n, fallibility)
    }

    /// Returns a reference to the value matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(hash_u64(42), |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(hash_u64(42), |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(hash_u64(99), |&n| n == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        Some(self.value_at(index))
    }

    /// Returns a mutable reference to the value matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u32, i32)> = HashTable::new();
    /// table.entry(0x1234, |&(k, _)| k == 1).or_insert((1, 10));
    ///
    /// if let Some((_, value)) = table.find_mut(0x1234, |&(k, _)| k == 1) {
    ///     *value += 5;
    /// }
    /// assert_eq!(table.find(0x1234, |&(k, _)| k == 1), Some(&(1, 15)));
    /// ```
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        Some(self.value_at_mut(index))
    }

    /// Removes and returns the value matching `hash` and `eq`.
    ///
    /// The hole left behind is closed by shifting the following entries of the
    /// probe run back towards their home slots, so no tombstones accumulate
    /// and every remaining entry stays reachable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(hash_u64(42), |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(hash_u64(42), |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(hash_u64(42), |&n| n == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        Some(self.remove_at(index))
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// The returned [`Entry`] is occupied when a matching value is already
    /// present. Inserting through a vacant entry places the value with Robin
    /// Hood displacement, growing the table if needed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// let hash = hash_str("hello");
    ///
    /// match table.entry(hash, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// assert!(matches!(
    ///     table.entry(hash, |s: &String| s == "hello"),
    ///     Entry::Occupied(_)
    /// ));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.find_index(hash, eq) {
            Some(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Returns an iterator over all values in the table.
    ///
    /// The iteration order is not specified and changes as the table grows.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The table keeps its capacity. Values not consumed by the iterator are
    /// dropped when the iterator is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// for v in 0..4u64 {
    ///     table.entry(v << 60, |&x| x == v).or_insert(v);
    /// }
    ///
    /// let mut values: Vec<u64> = table.drain().collect();
    /// values.sort();
    /// assert_eq!(values, [0, 1, 2, 3]);
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        let remaining = mem::replace(&mut self.populated, 0);
        Drain {
            slots: self.slots.iter_mut(),
            remaining,
        }
    }

    /// Computes a histogram of displacements for the current table state.
    ///
    /// Returns a vector of length `displacement_limit() + 1`, where index `d`
    /// counts the entries sitting `d` slots past their home slot.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; self.displacement_limit() + 1];
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(hash) = slot.hash() {
                hist[self.displacement(index, hash)] += 1;
            }
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = self.slots.len();
        let mut occupied_slots = 0;
        let mut max_displacement = 0;
        let mut total_displacement = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(hash) = slot.hash() {
                let displacement = self.displacement(index, hash);
                occupied_slots += 1;
                total_displacement += displacement;
                max_displacement = max_displacement.max(displacement);
            }
        }

        DebugStats {
            populated: self.populated,
            capacity_exponent: self.log_n,
            total_slots,
            occupied_slots,
            max_displacement,
            displacement_limit: self.displacement_limit(),
            mean_displacement: if occupied_slots == 0 {
                0.0
            } else {
                total_displacement as f64 / occupied_slots as f64
            },
            load_factor: if total_slots == 0 {
                0.0
            } else {
                occupied_slots as f64 / total_slots as f64
            },
            total_bytes: total_slots * mem::size_of::<Slot<V>>(),
            wasted_bytes: (total_slots - occupied_slots) * mem::size_of::<Slot<V>>(),
        }
    }

    /// Pretty-prints the displacement histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = *hist.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.populated);
        for (displacement, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", displacement, "█".repeat(width), count);
        }
    }

    #[inline(always)]
    fn next(&self, index: usize) -> usize {
        if index + 1 == self.slots.len() {
            0
        } else {
            index + 1
        }
    }

    #[inline(always)]
    fn displacement(&self, index: usize, hash: u64) -> usize {
        distance(home_slot(hash, self.log_n), index, self.slots.len())
    }

    #[inline(always)]
    fn value_at(&self, index: usize) -> &V {
        match &self.slots[index] {
            Slot::Occupied { value, .. } => value,
            Slot::Empty => unreachable!("slot {index} is empty"),
        }
    }

    #[inline(always)]
    fn value_at_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => value,
            Slot::Empty => unreachable!("slot {index} is empty"),
        }
    }

    /// Walks the probe run of `hash`, stopping at the first empty slot or once
    /// the displacement limit has been covered.
    #[inline]
    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let mut index = home_slot(hash, self.log_n);
        for _ in 0..=self.displacement_limit() {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied {
                    hash: resident,
                    value,
                } => {
                    if *resident == hash && eq(value) {
                        return Some(index);
                    }
                }
            }
            index = self.next(index);
        }

        None
    }

    /// Checks whether a Robin Hood insertion of `hash` reaches an empty slot
    /// without any entry along the walk exceeding the displacement limit.
    ///
    /// This is the read-only twin of `place`: it follows the same swaps, but
    /// only over cached hashes.
    fn has_room_for(&self, hash: u64) -> bool {
        let limit = self.displacement_limit();
        let mut index = home_slot(hash, self.log_n);
        let mut displacement = 0;

        for _ in 0..self.slots.len() {
            let Some(resident_hash) = self.slots[index].hash() else {
                return true;
            };

            let resident = self.displacement(index, resident_hash);
            if displacement > resident {
                displacement = resident;
            }

            index = self.next(index);
            displacement += 1;
            if displacement > limit {
                return false;
            }
        }

        false
    }

    /// Inserts `value` with Robin Hood displacement. The caller must have
    /// checked `has_room_for(hash)` at the current capacity.
    ///
    /// Returns the slot the new value landed in.
    fn place(&mut self, hash: u64, value: V) -> usize {
        let mut index = home_slot(hash, self.log_n);
        let mut displacement = 0;
        let mut carried = Slot::Occupied { hash, value };
        let mut landing = None;

        loop {
            let Some(resident_hash) = self.slots[index].hash() else {
                self.slots[index] = carried;
                self.populated += 1;
                return landing.unwrap_or(index);
            };

            // Only a strictly more displaced candidate takes the slot.
            let resident = self.displacement(index, resident_hash);
            if displacement > resident {
                mem::swap(&mut self.slots[index], &mut carried);
                if landing.is_none() {
                    landing = Some(index);
                }
                displacement = resident;
            }

            index = self.next(index);
            displacement += 1;
            debug_assert!(displacement <= self.displacement_limit());
        }
    }

    /// Inserts a value whose key is known to be absent, growing the table
    /// until the Robin Hood walk fits within the displacement limit.
    fn insert_absent(
        &mut self,
        hash: u64,
        value: V,
        fallibility: Fallibility,
    ) -> Result<usize, TryReserveError> {
        if self.log_n == 0 {
            self.resize(DEFAULT_CAPACITY_EXPONENT, fallibility)?;
        }

        while !self.has_room_for(hash) {
            log::trace!(
                "displacement limit {} reached inserting hash {:#018x}, growing",
                self.displacement_limit(),
                hash
            );
            if self.log_n >= MAX_CAPACITY_EXPONENT {
                return Err(fallibility.capacity_overflow());
            }
            self.resize(self.log_n + 1, fallibility)?;
        }

        Ok(self.place(hash, value))
    }

    fn remove_at(&mut self, index: usize) -> V {
        let value = match mem::replace(&mut self.slots[index], Slot::Empty).into_value() {
            Some(value) => value,
            None => unreachable!("slot {index} is empty"),
        };
        self.populated -= 1;
        self.backward_shift(index);
        value
    }

    /// Closes the hole at `gap` by pulling later entries of the run back.
    ///
    /// An entry may move into the gap when its home slot lies at or before the
    /// gap, i.e. when its displacement covers the distance back to it. Entries
    /// at zero displacement never move. The walk ends at the first empty slot,
    /// because resize placement does not keep runs sorted by home slot.
    fn backward_shift(&mut self, mut gap: usize) {
        let len = self.slots.len();
        let mut index = self.next(gap);

        while let Some(hash) = self.slots[index].hash() {
            if self.displacement(index, hash) >= distance(gap, index, len) {
                self.slots.swap(gap, index);
                gap = index;
            }
            index = self.next(index);
        }
    }

    /// Checks whether every entry can be moved to a table with exponent
    /// `log_n` by first-empty placement without exceeding that table's
    /// displacement limit. Only cached hashes are read.
    fn fits_at(&self, log_n: u32, fallibility: Fallibility) -> Result<bool, TryReserveError> {
        if self.populated == 0 {
            return Ok(true);
        }

        let len = bucket_count(log_n);
        let words = len.div_ceil(64);
        let layout =
            Layout::array::<u64>(words).map_err(|_| fallibility.capacity_overflow())?;
        let mut taken: Vec<u64> = try_zeroed_vec(words, layout, fallibility)?;

        let limit = displacement_limit(log_n);
        for hash in self.slots.iter().filter_map(Slot::hash) {
            let mut index = home_slot(hash, log_n);
            let mut displacement = 0;
            while taken[index / 64] & (1 << (index % 64)) != 0 {
                index = if index + 1 == len { 0 } else { index + 1 };
                displacement += 1;
                if displacement > limit {
                    return Ok(false);
                }
            }
            taken[index / 64] |= 1 << (index % 64);
        }

        Ok(true)
    }

    /// Moves every entry into a fresh array of at least exponent `log_n`.
    ///
    /// The exponent is raised further if first-empty placement would leave an
    /// entry beyond the displacement limit. Nothing is moved until the new
    /// array has been allocated, so an error leaves the table untouched.
    #[cold]
    #[inline(never)]
    fn resize(&mut self, log_n: u32, fallibility: Fallibility) -> Result<(), TryReserveError> {
        debug_assert!(log_n > self.log_n);

        let mut log_n = log_n;
        loop {
            slot_layout::<V>(log_n, fallibility)?;
            if self.fits_at(log_n, fallibility)? {
                break;
            }
            if log_n >= MAX_CAPACITY_EXPONENT {
                return Err(fallibility.capacity_overflow());
            }
            log_n += 1;
        }

        let layout = slot_layout::<V>(log_n, fallibility)?;
        let len = bucket_count(log_n);
        let mut slots: Vec<Slot<V>> = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| fallibility.alloc_err(layout))?;
        slots.resize_with(len, || Slot::Empty);

        log::debug!(
            "resizing hash table: capacity exponent {} -> {}, {} entries",
            self.log_n,
            log_n,
            self.populated
        );

        let old = mem::replace(&mut self.slots, slots.into_boxed_slice());
        self.log_n = log_n;

        for slot in old.into_vec() {
            if let Slot::Occupied { hash, value } = slot {
                let mut index = home_slot(hash, log_n);
                while self.slots[index].is_occupied() {
                    index = self.next(index);
                }
                self.slots[index] = Slot::Occupied { hash, value };
            }
        }

        debug_assert!(self.max_displacement() <= self.displacement_limit());
        Ok(())
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<String> = HashTable::new();
    ///
    /// let value = table
    ///     .entry(1 << 63, |s| s == "key")
    ///     .or_insert("key".to_string());
    /// assert_eq!(value, "key");
    ///
    /// // The existing value is kept.
    /// let value = table
    ///     .entry(1 << 63, |s| s == "key")
    ///     .or_insert("other".to_string());
    /// assert_eq!(value, "key");
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value if the entry is occupied and returns a
    /// mutable reference to it. Vacant entries are left alone and yield
    /// `None`.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the hash table.
///
/// This struct is created by the [`entry`] method on [`HashTable`] when no
/// matching value is present.
///
/// [`entry`]: HashTable::entry
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Returns the hash the entry was looked up with.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Inserts a value into the vacant entry and returns a mutable reference
    /// to it.
    ///
    /// The table is allocated or grown as needed.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts on allocation failure.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        let index = infallible(table.insert_absent(self.hash, value, Fallibility::Infallible));
        table.value_at_mut(index)
    }

    /// Tries to insert a value into the vacant entry.
    ///
    /// If the table cannot grow, the value is dropped and the existing
    /// entries are unchanged. The table may already have grown one or more
    /// times before the failing step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u32> = HashTable::new();
    /// if let Entry::Vacant(entry) = table.entry(99, |&v| v == 5) {
    ///     assert_eq!(entry.try_insert(5), Ok(&mut 5));
    /// }
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn try_insert(self, value: V) -> Result<&'a mut V, TryReserveError> {
        let table = self.table;
        let index = table.insert_absent(self.hash, value, Fallibility::Fallible)?;
        Ok(table.value_at_mut(index))
    }
}

/// A view into an occupied entry in the hash table.
///
/// This struct is created by the [`entry`] method on [`HashTable`] when a
/// matching value is present.
///
/// [`entry`]: HashTable::entry
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.table.value_at(self.index)
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.value_at_mut(self.index)
    }

    /// Converts the entry into a mutable reference to its value, bound to
    /// the lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        table.value_at_mut(self.index)
    }

    /// Replaces the value in the entry and returns the old one.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the table and returns its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u32> = HashTable::new();
    /// table.entry(7, |&v| v == 7).or_insert(7);
    ///
    /// match table.entry(7, |&v| v == 7) {
    ///     Entry::Occupied(entry) => assert_eq!(entry.remove(), 7),
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(self) -> V {
        self.table.remove_at(self.index)
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Some(value) = mem::replace(slot, Slot::Empty).into_value() {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Some(value) = slot.into_value() {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            slots: self.slots.into_vec().into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
