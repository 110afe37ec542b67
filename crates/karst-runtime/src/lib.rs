//! Process-wide materialization of compile-time literals.
//!
//! The karst compiler turns literal data found in source programs (strings,
//! arrays, boxed scalars) into entries in three per-kind tables. Generated
//! class descriptors reference those entries through [`ConstSlot`] proxies;
//! the first dereference builds the value, every later dereference is a
//! plain read. Construction is first-touch rather than declaration-order,
//! so generated translation units can link in any order without
//! use-before-initialization hazards.

mod sched;
mod slot;
mod snapshot;
mod table;
mod value;

pub use karst_base::{fatal, ConstError, ContentKey, LiteralKind};
pub use slot::ConstSlot;
pub use snapshot::{readiness, snapshot};
pub use table::{
    arrays, strings, variants, ArrayTable, ConstTable, StringTable, VariantTable,
};
pub use value::{
    ArrayKey, ArraySpec, ConstVariant, LiteralSpec, StaticArray, StaticText, TextSpec,
    VariantSpec,
};
