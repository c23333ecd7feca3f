use std::collections::HashMap;

use string_cache::DefaultAtom;
use tracing::{debug, trace};

use crate::error::SymbolTableError;

/// What a name is bound to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntryKind {
  Number,
  String,
  Boolean,
  Function,
}

/**
  A `(name, kind, value)` record stored in one scope. `value` is whatever handle the caller uses
  to refer to the bound thing, usually a reference. The binding owns the handle, not the thing
  it refers to.
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Binding<V> {
  name  : DefaultAtom,
  kind  : EntryKind,
  value : V,
}

impl<V> Binding<V> {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> EntryKind {
    self.kind
  }

  pub fn value(&self) -> &V {
    &self.value
  }
}

type Scope<V> = HashMap<DefaultAtom, Binding<V>>;

/**
  A symbol table for name resolution is a stack of lexical scopes, each a mapping from names to
  bindings. Scopes are entered and left in strict LIFO order following the nesting of the
  program being analyzed. Lookup searches from the innermost scope outward, so an inner binding
  shadows an outer one of the same name until its scope is left.

  There is always at least one scope: the root scope exists for the whole life of the table and
  cannot be left. Names are interned. As with all strings in this codebase, the `DefaultAtom`
  makes clones of a name cheap.
*/
#[derive(Clone, Debug)]
pub struct SymbolTable<V> {
  scopes: Vec<Scope<V>>
}

impl<V> SymbolTable<V> {

  /// A table holding only an empty root scope.
  pub fn new() -> SymbolTable<V> {
    SymbolTable {
      scopes: vec![HashMap::new()]
    }
  }

  /// The number of scopes, counting the root.
  pub fn depth(&self) -> usize {
    self.scopes.len()
  }

  pub fn is_root(&self) -> bool {
    self.scopes.len() == 1
  }

  pub fn enter_scope(&mut self) {
    self.scopes.push(HashMap::new());
    trace!(depth = self.depth(), "enter scope");
  }

  /**
    Discards the innermost scope and its bindings. Leaving the root scope means enter and leave
    calls are unbalanced, which is an error in the caller; the table is left unchanged.
  */
  pub fn leave_scope(&mut self) -> Result<(), SymbolTableError> {
    if self.is_root() {
      return Err(SymbolTableError::LeaveRootScope);
    }
    let scope = self.scopes.pop();
    trace!(
      depth = self.depth(),
      released = scope.map_or(0, |s| s.len()),
      "leave scope"
    );
    Ok(())
  }

  /**
    Binds `name` in the innermost scope. If the innermost scope already binds `name`, the new
    binding replaces it and the old one is returned. Bindings of `name` in outer scopes are
    untouched.
  */
  pub fn insert(&mut self, name: &str, kind: EntryKind, value: V) -> Option<Binding<V>> {
    let depth = self.depth();
    let name  = DefaultAtom::from(name);
    let binding = Binding { name: name.clone(), kind, value };

    if !self.is_root() && self.lookup_local(&name).is_none() && self.lookup(&name).is_some() {
      debug!(name = %name, depth, "binding shadows an outer scope");
    }

    let previous = match self.scopes.last_mut() {
      Some(scope) => scope.insert(name.clone(), binding),
      None        => unreachable!("symbol table lost its root scope"),
    };
    match previous {
      Some(_) => debug!(name = %name, depth, "binding replaced in the same scope"),
      None    => trace!(name = %name, ?kind, depth, "insert"),
    }
    previous
  }

  /// Finds the innermost binding of `name`.
  pub fn lookup(&self, name: &str) -> Option<&Binding<V>> {
    let name = DefaultAtom::from(name);
    self.scopes.iter().rev().find_map(|scope| scope.get(&name))
  }

  /// Finds a binding of `name` in the innermost scope only.
  pub fn lookup_local(&self, name: &str) -> Option<&Binding<V>> {
    let name = DefaultAtom::from(name);
    self.scopes.last().and_then(|scope| scope.get(&name))
  }

}

impl<V> Default for SymbolTable<V> {
  fn default() -> Self {
    SymbolTable::new()
  }
}
