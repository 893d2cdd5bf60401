//! Editor-facing views over the database: program snapshots and the flat
//! symbol list used by completion.

pub mod symbols;

pub use symbols::{
    Binding, BindingKind, ClassInfo, NamespaceInfo, ProgramSnapshot, create_symbol_list,
};
