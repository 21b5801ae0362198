use ahash::HashMap;
use ahash::HashMapExt;
use serde::Serialize;
use serde::Serializer;

/// A deduplicated identifier. Two identifiers from the same [Interner] refer
/// to the same text iff they are equal, so comparisons are integer compares.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Identifier(u32);

impl Identifier {
  // Pre-interned by Interner::new, in this order.
  pub const EVAL: Identifier = Identifier(0);
  pub const ARGUMENTS: Identifier = Identifier(1);

  pub fn as_u32(self) -> u32 {
    self.0
  }
}

impl Serialize for Identifier {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32(self.0)
  }
}

/// Deduplicating identifier table. Owned by the caller so it can be reused
/// across parses of related sources; the crate performs no locking of its own,
/// so sharing one table across threads requires external synchronization.
pub struct Interner {
  lookup: HashMap<Box<str>, Identifier>,
  names: Vec<Box<str>>,
}

impl Interner {
  pub fn new() -> Interner {
    let mut interner = Interner {
      lookup: HashMap::new(),
      names: Vec::new(),
    };
    let eval = interner.intern("eval");
    let arguments = interner.intern("arguments");
    debug_assert_eq!(eval, Identifier::EVAL);
    debug_assert_eq!(arguments, Identifier::ARGUMENTS);
    interner
  }

  pub fn intern(&mut self, name: &str) -> Identifier {
    if let Some(&id) = self.lookup.get(name) {
      return id;
    };
    let id = Identifier(self.names.len().try_into().expect("interner overflow"));
    let owned: Box<str> = name.into();
    self.names.push(owned.clone());
    self.lookup.insert(owned, id);
    id
  }

  /// Returns the id for `name` only if it has been interned before.
  pub fn get(&self, name: &str) -> Option<Identifier> {
    self.lookup.get(name).copied()
  }

  pub fn text(&self, id: Identifier) -> &str {
    &self.names[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

impl Default for Interner {
  fn default() -> Self {
    Interner::new()
  }
}
