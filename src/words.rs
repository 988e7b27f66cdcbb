use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use core::slice;
#[cfg(feature = "serde-1")]
use serde::{Deserialize, Deserializer, Serialize};

pub(crate) type Word = u64;

pub(crate) const WORD_BITS: usize = Word::BITS as usize;

/// A sequence of words where every index past the end reads as zero
///
/// It only grows to the smallest length covering an index written through [`Words::get_mut`].
/// Every public `BitSet` operation ends with [`Words::trim`], so equality and hashing compare
/// the stored words directly
#[derive(Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-1", derive(Serialize), serde(transparent))]
pub(crate) struct Words(Vec<Word>);

#[cfg(feature = "serde-1")]
impl<'de> Deserialize<'de> for Words {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut words = Words(Vec::deserialize(deserializer)?);
        words.trim();
        Ok(words)
    }
}

impl Clone for Words {
    fn clone(&self) -> Self {
        Words(self.0.clone())
    }

    fn clone_from(&mut self, source: &Self) {
        self.0.clear();
        self.0.extend_from_slice(&source.0);
    }
}

#[test]
fn test_clone_from_replaces_contents() {
    let mut long = Words::new();
    *long.get_mut(5) = 7;
    let mut short = Words::new();
    *short.get_mut(0) = 3;

    let mut x = short.clone();
    x.clone_from(&long);
    assert_eq!((x.get(0), x.get(5), x.len()), (0, 7, 6));

    let mut x = long.clone();
    x.clone_from(&short);
    assert_eq!((x.get(0), x.get(5), x.len()), (3, 0, 1));
    assert_eq!(x, short);
}

#[test]
fn test_trim_restores_equality() {
    let mut x = Words::new();
    *x.get_mut(42) = 3;
    *x.get_mut(42) = 0;
    assert_eq!(x.len(), 43);
    assert_ne!(x, Words::new());
    x.trim();
    assert_eq!(x.len(), 0);
    assert_eq!(x, Words::new())
}

impl Debug for Words {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

impl Words {
    pub(crate) const fn new() -> Self {
        Words(Vec::new())
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, i: usize) {
        self.0.resize(i + 1, 0);
    }

    /// Returns mutable access to the word at `i`, appending zero words until it exists
    pub(crate) fn get_mut(&mut self, i: usize) -> &mut Word {
        if i >= self.0.len() {
            self.grow(i);
        }
        &mut self.0[i]
    }

    /// Returns mutable access to the word at `i` only if it is already stored
    pub(crate) fn get_mut_stored(&mut self, i: usize) -> Option<&mut Word> {
        self.0.get_mut(i)
    }

    /// Returns the word at `i`, or zero if it isn't stored
    pub(crate) fn get(&self, i: usize) -> Word {
        self.0.get(i).copied().unwrap_or_default()
    }

    /// Number of stored words
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Drops every stored word
    pub(crate) fn clear(&mut self) {
        self.0.clear()
    }

    /// Drops trailing zero words
    pub(crate) fn trim(&mut self) {
        while self.0.last() == Some(&0) {
            self.0.pop();
        }
    }

    /// Applies `f(self[i], other[i])` to every word stored in `self`,
    /// reading words missing from `other` as zero
    pub(crate) fn combine_stored(&mut self, other: &Words, f: impl Fn(Word, Word) -> Word) {
        for (i, w) in self.0.iter_mut().enumerate() {
            *w = f(*w, other.get(i));
        }
        self.trim()
    }

    /// Applies `f(self[i], other[i])` to every word stored in either sequence,
    /// zero-extending `self` first so it never has a gap
    pub(crate) fn combine_extended(&mut self, other: &Words, f: impl Fn(Word, Word) -> Word) {
        if other.0.len() > self.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        for (w, o) in self.0.iter_mut().zip(&other.0) {
            *w = f(*w, *o);
        }
        self.trim()
    }

    pub(crate) fn iter(&self) -> slice::Iter<'_, Word> {
        self.0.iter()
    }
}

#[test]
fn test_get_mut_grows_exactly() {
    let mut x = Words::new();
    assert_eq!(x.get(3), 0);
    assert_eq!(x.len(), 0);
    *x.get_mut(3) |= 1;
    assert_eq!(x.len(), 4);
    assert!(x.get_mut_stored(4).is_none());
    assert_eq!(x.len(), 4);
}

#[test]
fn test_combine_extended_fills_gap() {
    let mut x = Words::new();
    *x.get_mut(0) = 1;
    let mut y = Words::new();
    *y.get_mut(3) = 8;
    x.combine_extended(&y, |a, b| a | b);
    assert_eq!(x.len(), 4);
    assert_eq!((x.get(0), x.get(1), x.get(2), x.get(3)), (1, 0, 0, 8));
}

#[test]
fn test_combine_stored_trims() {
    let mut x = Words::new();
    *x.get_mut(0) = 0b11;
    *x.get_mut(2) = 0b1;
    let mut y = Words::new();
    *y.get_mut(0) = 0b10;
    x.combine_stored(&y, |a, b| a & b);
    assert_eq!(x.len(), 1);
    assert_eq!(x.get(0), 0b10);
}
