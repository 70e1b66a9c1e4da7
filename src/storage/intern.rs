//! String interning.
//!
//! Every distinct byte sequence is stored once and identified by a
//! [`Symbol`]. Interning the same bytes twice yields the same symbol, so
//! identifier comparison downstream is a plain integer comparison.
//!
//! Entries are never removed. A [`SharedInterner`] wraps the table in a lock
//! so several sessions can agree on identities.

use super::buffer::Buffer;
use rustc_hash::{FxHashMap, FxHasher};
use std::fmt;
use std::hash::Hasher;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Handle to an interned byte sequence.
///
/// Two symbols from the same interner are equal if and only if the bytes
/// they were interned from are equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Position of the entry in its interner's table.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything the lexer can canonicalize identifier spellings through.
pub trait Interner {
    /// Return the canonical symbol for `bytes`, inserting it if new.
    fn intern(&mut self, bytes: &[u8]) -> Symbol;

    /// Spelling of `symbol`, or `None` if it did not come from this table.
    fn spelling(&self, symbol: Symbol) -> Option<String>;
}

impl<I: Interner + ?Sized> Interner for &mut I {
    fn intern(&mut self, bytes: &[u8]) -> Symbol {
        (**self).intern(bytes)
    }

    fn spelling(&self, symbol: Symbol) -> Option<String> {
        (**self).spelling(symbol)
    }
}

#[derive(Debug)]
struct Entry {
    len: usize,
    bytes: Box<[u8]>,
}

/// Append-only table of unique byte sequences.
#[derive(Debug, Default)]
pub struct StringInterner {
    entries: Buffer<Entry>,
    /// Symbols grouped by content hash, in insertion order.
    buckets: FxHashMap<u64, Vec<Symbol>>,
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a byte range.
    pub fn intern(&mut self, bytes: &[u8]) -> Symbol {
        let key = fingerprint(bytes);
        if let Some(symbol) = self.find(key, bytes) {
            return symbol;
        }

        assert!(
            self.entries.len() < u32::MAX as usize,
            "Interner capacity exceeded"
        );
        let symbol = Symbol(self.entries.len() as u32);
        self.entries.push(Entry {
            len: bytes.len(),
            bytes: bytes.into(),
        });
        self.buckets.entry(key).or_default().push(symbol);
        symbol
    }

    /// Intern text; same as `intern(text.as_bytes())`.
    pub fn intern_str(&mut self, text: &str) -> Symbol {
        self.intern(text.as_bytes())
    }

    /// Symbol for `bytes` if it has already been interned.
    pub fn lookup(&self, bytes: &[u8]) -> Option<Symbol> {
        self.find(fingerprint(bytes), bytes)
    }

    /// Bytes behind `symbol`.
    pub fn resolve(&self, symbol: Symbol) -> Option<&[u8]> {
        self.entries
            .get(symbol.index() as usize)
            .map(|entry| &*entry.bytes)
    }

    /// Bytes behind `symbol` as text, if they are valid UTF-8.
    pub fn resolve_str(&self, symbol: Symbol) -> Option<&str> {
        self.resolve(symbol)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &[u8])> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (Symbol(i as u32), &*entry.bytes))
    }

    fn find(&self, key: u64, bytes: &[u8]) -> Option<Symbol> {
        let candidates = self.buckets.get(&key)?;
        candidates.iter().copied().find(|symbol| {
            let entry = &self.entries[symbol.index() as usize];
            entry.len == bytes.len() && *entry.bytes == *bytes
        })
    }
}

impl Interner for StringInterner {
    fn intern(&mut self, bytes: &[u8]) -> Symbol {
        StringInterner::intern(self, bytes)
    }

    fn spelling(&self, symbol: Symbol) -> Option<String> {
        self.resolve(symbol)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Cloneable handle to one interner shared between sessions and threads.
///
/// Inserts take the write lock, lookups only the read lock. The table is
/// append-only, so a poisoned lock still guards a consistent table and is
/// recovered rather than propagated.
#[derive(Debug, Clone, Default)]
pub struct SharedInterner {
    table: Arc<RwLock<StringInterner>>,
}

impl SharedInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, bytes: &[u8]) -> Symbol {
        if let Some(symbol) = self.read().lookup(bytes) {
            return symbol;
        }
        // Another thread may have inserted between the two locks; `intern`
        // rechecks under the write lock.
        self.write().intern(bytes)
    }

    pub fn lookup(&self, bytes: &[u8]) -> Option<Symbol> {
        self.read().lookup(bytes)
    }

    /// Owned copy of the bytes behind `symbol`.
    pub fn resolve(&self, symbol: Symbol) -> Option<Box<[u8]>> {
        self.read().resolve(symbol).map(Box::from)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, StringInterner> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StringInterner> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Interner for SharedInterner {
    fn intern(&mut self, bytes: &[u8]) -> Symbol {
        SharedInterner::intern(self, bytes)
    }

    fn spelling(&self, symbol: Symbol) -> Option<String> {
        self.read()
            .resolve(symbol)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}
