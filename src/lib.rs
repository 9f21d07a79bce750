//! # alphabet-bdd: symbolic alphabets as Binary Decision Diagrams
//!
//! **`alphabet-bdd`** represents sets of integers (typically character codes) as
//! canonical **Binary Decision Diagrams** over their bits, and compiles the
//! partition induced by a family of such sets into compact **bit vectors**.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: All operations go through the [`Bdd`][crate::bdd::Bdd] manager.
//!   Nodes are hash-consed, so equal sets are equal [`Ref`][crate::reference::Ref] handles.
//! - **Thread-Safe**: A `Bdd` is `Sync`. Cache hits only take a shared lock, and every
//!   operation result is computed once.
//! - **Intervals**: Build sets from numeric ranges, shift them, and read them back as ranges.
//! - **Exact Counting**: Domain sizes are computed as [`BigUint`][num_bigint::BigUint].
//! - **Minterms**: A generic partition algorithm over any [`BooleanAlgebra`][crate::minterm::BooleanAlgebra].
//! - **Compiled Alphabets**: [`BvAlgebra`][crate::bv_algebra::BvAlgebra] turns a partition into
//!   fixed-width bit vectors, keeping the size of every block for weighted counting.
//!
//! ## Basic Usage
//!
//! ```rust
//! use alphabet_bdd::bdd::Bdd;
//! use num_bigint::BigUint;
//!
//! let bdd = Bdd::default();
//!
//! // Sets of 8-bit values.
//! let digits = bdd.mk_range(b'0' as u64, b'9' as u64, 7).unwrap();
//! let hex = bdd.mk_range(b'a' as u64, b'f' as u64, 7).unwrap();
//! let set = bdd.apply_or(digits, hex).unwrap();
//!
//! assert!(bdd.contains(set, b'c' as u64));
//! assert_eq!(bdd.domain_size(set, 7).unwrap(), BigUint::from(16u32));
//! assert_eq!(bdd.get_min(set).unwrap(), b'0' as u64);
//! assert_eq!(bdd.pretty_print(set, 7).unwrap(), "[0-9a-f]");
//! ```
//!
//! ## Compiling a Partition
//!
//! ```rust
//! use alphabet_bdd::bdd::Bdd;
//! use alphabet_bdd::bv_algebra::BvAlgebra;
//! use alphabet_bdd::reference::Ref;
//! use num_bigint::BigUint;
//!
//! let bdd = Bdd::default();
//! let lower = bdd.mk_range(b'a' as u64, b'z' as u64, 7).unwrap();
//! let vowels = bdd.apply_or_many([b'a', b'e', b'i', b'o', b'u'].map(|c| bdd.mk_value(c as u64, 7).unwrap())).unwrap();
//!
//! let minterms: Vec<Ref> = bdd.generate_minterms(&[lower, vowels]).unwrap().into_iter().map(|m| m.pred).collect();
//! let alg = BvAlgebra::new(&bdd, &minterms, 7).unwrap();
//!
//! let consonants = alg.char_constraint(b'x' as u64);
//! assert_eq!(alg.domain_size(&consonants), BigUint::from(21u32));
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: The [`Bdd`][crate::bdd::Bdd] manager, Boolean operations and locking.
//! - **[`range`]**, **[`count`]**, **[`eval`]**: Interval construction, counting, point queries.
//! - **[`minterm`]**: Minterm generation.
//! - **[`bv_algebra`]**, **[`classifier`]**: The compiled bit-vector algebra.

pub mod bdd;
pub mod bitvec;
pub mod bv_algebra;
pub mod cache;
pub mod classifier;
pub mod count;
pub mod error;
pub mod eval;
pub mod minterm;
pub mod node;
pub mod pretty;
pub mod range;
pub mod reference;
pub mod storage;
pub mod terminal;
