//! Flat symbol enumeration for completion.

use smol_str::SmolStr;

/// What a global binding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Class,
    Namespace,
    Value,
}

/// A name bound in the global scope of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: SmolStr,
    pub kind: BindingKind,
}

/// A class with its methods, prototype and static sides kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: SmolStr,
    pub proto_methods: Vec<SmolStr>,
    pub static_methods: Vec<SmolStr>,
}

/// A namespace object and the names bound inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub name: SmolStr,
    pub bindings: Vec<Binding>,
}

/// A point-in-time view of a running program's global scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSnapshot {
    pub classes: Vec<ClassInfo>,
    pub namespaces: Vec<NamespaceInfo>,
}

/// Enumerate completion candidates from a snapshot: class names, then
/// namespace names, then every method of every class (prototype side before
/// static side), then the plain value bindings of every namespace. Bindings
/// that name a class or a nested namespace are skipped; those names are
/// already listed.
///
/// Duplicates are preserved. The consumer ranks and filters; collapsing
/// repeats here would hide how often a name occurs.
pub fn create_symbol_list(snapshot: &ProgramSnapshot) -> Vec<SmolStr> {
    let mut symbols = Vec::new();
    for class in &snapshot.classes {
        symbols.push(class.name.clone());
    }
    for namespace in &snapshot.namespaces {
        symbols.push(namespace.name.clone());
    }
    for class in &snapshot.classes {
        symbols.extend(class.proto_methods.iter().cloned());
        symbols.extend(class.static_methods.iter().cloned());
    }
    for namespace in &snapshot.namespaces {
        for binding in &namespace.bindings {
            if binding.kind == BindingKind::Value {
                symbols.push(binding.name.clone());
            }
        }
    }
    symbols
}
