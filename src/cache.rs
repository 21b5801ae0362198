use crate::ast::func::FuncFlags;
use crate::interner::Identifier;
use crate::loc::Pos;
use ahash::HashMap;
use ahash::HashMapExt;

/// Everything needed to skip a function body on a later parse of the same
/// source: where to resume lexing, the analysis flags of the function, and its
/// free names so the enclosing scopes fold up exactly as if the body had been
/// parsed again.
pub struct ReparseCacheEntry {
  /// Start of the body's closing `}` token.
  pub close_brace: Pos,
  pub flags: FuncFlags,
  pub free_used: Vec<Identifier>,
  pub free_written: Vec<Identifier>,
}

/// Cache of function body analyses, keyed by the byte offset of the body's
/// opening `{`. Owned by the caller and handed to [crate::parse] when the same
/// source is parsed more than once (an eval string, a lazily re-parsed
/// function). Identifiers inside are only meaningful together with the
/// [crate::interner::Interner] used for the original parse.
pub struct ReparseCache {
  entries: HashMap<usize, ReparseCacheEntry>,
}

impl ReparseCache {
  pub fn new() -> ReparseCache {
    ReparseCache {
      entries: HashMap::new(),
    }
  }

  pub fn get(&self, open_brace: usize) -> Option<&ReparseCacheEntry> {
    self.entries.get(&open_brace)
  }

  /// Entries are immutable: inserting at an occupied offset keeps the
  /// original, which by construction holds the same analysis.
  pub fn insert(&mut self, open_brace: usize, entry: ReparseCacheEntry) {
    self.entries.entry(open_brace).or_insert(entry);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

impl Default for ReparseCache {
  fn default() -> Self {
    ReparseCache::new()
  }
}
