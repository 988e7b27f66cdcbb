use crate::words::{Word, Words, WORD_BITS};
use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use core::iter::{Enumerate, FusedIterator};
use core::marker::PhantomData;
use core::ops::{BitAndAssign, BitOrAssign, BitXorAssign, SubAssign};
use core::slice;
#[cfg(feature = "serde-1")]
use serde::{Deserialize, Serialize};

/// A set of non-negative integers stored as a bit-vector of 64 bit words
///
/// Bit `b` of word `w` marks membership of `64 * w + b`. The words grow lazily to cover the
/// largest inserted element and trailing zero words are dropped again by every operation that can
/// produce them, so memory tracks the largest member rather than the largest ever inserted.
///
/// Members are indexed by any `I: Into<usize>`; iteration always yields `usize`.
///
/// `BitSet` does no internal synchronization; callers sharing one across threads must provide
/// their own lock.
#[cfg_attr(
    feature = "serde-1",
    derive(Serialize, Deserialize),
    serde(transparent, bound = "")
)]
pub struct BitSet<I = usize>(Words, PhantomData<I>);

#[inline]
fn split(x: usize) -> (usize, Word) {
    (x / WORD_BITS, 1 << (x % WORD_BITS))
}

impl<I> Default for BitSet<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Clone for BitSet<I> {
    fn clone(&self) -> Self {
        BitSet(self.0.clone(), PhantomData)
    }

    fn clone_from(&mut self, source: &Self) {
        self.0.clone_from(&source.0)
    }
}

impl<I> PartialEq for BitSet<I> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<I> Eq for BitSet<I> {}

impl<I> Hash for BitSet<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<I> BitSet<I> {
    /// Creates an empty set without allocating
    pub const fn new() -> Self {
        BitSet(Words::new(), PhantomData)
    }

    /// Removes all elements from the set
    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// Number of elements that fit without growing the underlying words
    pub fn capacity(&self) -> usize {
        self.0.len() * WORD_BITS
    }

    /// Returns the number of elements in the set
    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if the set has no elements
    ///
    /// Trailing zero words are always trimmed, so an empty set stores no words
    pub fn is_empty(&self) -> bool {
        self.0.len() == 0
    }

    /// Adds every element of `other` to `self`
    ///
    /// ```
    /// use intset::BitSet;
    /// let mut x: BitSet = [1, 3, 5].into_iter().collect();
    /// let y: BitSet = [2, 4, 600].into_iter().collect();
    /// x.union_with(&y);
    /// assert_eq!(x.to_string(), "{1 2 3 4 5 600}");
    /// ```
    pub fn union_with(&mut self, other: &Self) {
        self.0.combine_extended(&other.0, |a, b| a | b)
    }

    /// Removes every element of `self` that isn't in `other`
    ///
    /// ```
    /// use intset::BitSet;
    /// let mut x: BitSet = [1, 2, 3, 4, 900].into_iter().collect();
    /// let y: BitSet = [2, 4, 6].into_iter().collect();
    /// x.intersect_with(&y);
    /// assert_eq!(x.to_string(), "{2 4}");
    /// assert_eq!(x.capacity(), 64);
    /// ```
    pub fn intersect_with(&mut self, other: &Self) {
        self.0.combine_stored(&other.0, |a, b| a & b)
    }

    /// Removes every element of `other` from `self`
    ///
    /// ```
    /// use intset::BitSet;
    /// let mut x: BitSet = [2, 4, 6].into_iter().collect();
    /// let z: BitSet = [4, 6, 1000].into_iter().collect();
    /// x.difference_with(&z);
    /// assert_eq!(x.to_string(), "{2}");
    /// ```
    pub fn difference_with(&mut self, other: &Self) {
        self.0.combine_stored(&other.0, |a, b| a & !b)
    }

    /// Keeps the elements that are in exactly one of `self` and `other`
    ///
    /// ```
    /// use intset::BitSet;
    /// let mut x: BitSet = [1, 2, 3].into_iter().collect();
    /// let y: BitSet = [2, 3, 200].into_iter().collect();
    /// x.symmetric_difference_with(&y);
    /// assert_eq!(x.to_string(), "{1 200}");
    /// ```
    pub fn symmetric_difference_with(&mut self, other: &Self) {
        self.0.combine_extended(&other.0, |a, b| a ^ b)
    }

    /// Iterate over the elements of `self` in increasing order
    /// ```
    /// use intset::BitSet;
    /// let s: BitSet = [1020, 1, 144, 9].into_iter().collect();
    /// let res: Vec<_> = s.iter().collect();
    /// assert_eq!(res, [1, 9, 144, 1020])
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: self.0.iter().enumerate(),
            base: 0,
            current: 0,
        }
    }
}

impl<I: Into<usize>> BitSet<I> {
    /// Adds `x` to the set, returns `true` if it wasn't already present
    ///
    /// ```
    /// use intset::BitSet;
    /// let mut s: BitSet = BitSet::new();
    /// assert!(s.insert(144));
    /// assert!(!s.insert(144));
    /// assert_eq!(s.len(), 1);
    /// ```
    pub fn insert(&mut self, x: I) -> bool {
        let x = x.into();
        let (word_idx, mask) = split(x);
        let word = self.0.get_mut(word_idx);
        let added = *word & mask == 0;
        *word |= mask;
        debug_assert!(self.contains_usize(x));
        added
    }

    /// Removes `x` from the set, returns `true` if it was present
    ///
    /// Removing an element past the end of the stored words never grows them
    pub fn remove(&mut self, x: I) -> bool {
        let x = x.into();
        let (word_idx, mask) = split(x);
        let removed = match self.0.get_mut_stored(word_idx) {
            Some(word) => {
                let removed = *word & mask != 0;
                *word &= !mask;
                removed
            }
            None => false,
        };
        if removed {
            self.0.trim();
        }
        debug_assert!(!self.contains_usize(x));
        removed
    }

    /// Returns `true` if `x` is in the set
    pub fn contains(&self, x: I) -> bool {
        self.contains_usize(x.into())
    }

    fn contains_usize(&self, x: usize) -> bool {
        let (word_idx, mask) = split(x);
        self.0.get(word_idx) & mask != 0
    }
}

impl<I: Into<usize>> Extend<I> for BitSet<I> {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl<I: Into<usize>> FromIterator<I> for BitSet<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut res = BitSet::new();
        res.extend(iter);
        res
    }
}

impl<I> BitOrAssign<&BitSet<I>> for BitSet<I> {
    fn bitor_assign(&mut self, rhs: &BitSet<I>) {
        self.union_with(rhs)
    }
}

impl<I> BitAndAssign<&BitSet<I>> for BitSet<I> {
    fn bitand_assign(&mut self, rhs: &BitSet<I>) {
        self.intersect_with(rhs)
    }
}

impl<I> SubAssign<&BitSet<I>> for BitSet<I> {
    fn sub_assign(&mut self, rhs: &BitSet<I>) {
        self.difference_with(rhs)
    }
}

impl<I> BitXorAssign<&BitSet<I>> for BitSet<I> {
    fn bitxor_assign(&mut self, rhs: &BitSet<I>) {
        self.symmetric_difference_with(rhs)
    }
}

/// Iterator over the elements of a [`BitSet`] in increasing order
#[derive(Clone)]
pub struct Iter<'a> {
    words: Enumerate<slice::Iter<'a, Word>>,
    base: usize,
    current: Word,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            let (i, &word) = self.words.next()?;
            self.base = i * WORD_BITS;
            self.current = word;
        }
        let bit = self.current.trailing_zeros() as usize;
        // clear lowest set bit
        self.current &= self.current - 1;
        Some(self.base + bit)
    }
}

impl FusedIterator for Iter<'_> {}

impl<'a, I> IntoIterator for &'a BitSet<I> {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<I> Debug for BitSet<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Formats as `{1 9 144}`, the empty set as `{}`
impl<I> Display for BitSet<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, x) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
fn assert_canonical<I>(s: &BitSet<I>) {
    assert_ne!(s.0.iter().next_back(), Some(&0));
}

#[test]
fn test_empty() {
    use alloc::string::ToString;
    let s: BitSet = BitSet::new();
    assert_eq!(s.to_string(), "{}");
    assert_eq!(s.len(), 0);
    assert!(s.is_empty());
    assert_eq!(s.capacity(), 0);
}

#[test]
fn test_insert_and_display() {
    use alloc::string::ToString;
    let mut x: BitSet = BitSet::new();
    x.extend([1, 144, 9, 1020]);
    assert_eq!(x.to_string(), "{1 9 144 1020}");
    assert_eq!(x.len(), 4);
    assert_eq!(x.capacity(), 1024);
    assert!(x.contains(144));
    assert!(!x.contains(145));
    assert!(!x.contains(1_000_000));
    x.extend([5, 7, 10]);
    assert_eq!(x.to_string(), "{1 5 7 9 10 144 1020}");
}

#[test]
fn test_insert_idempotent() {
    let mut x: BitSet = BitSet::new();
    x.insert(63);
    let once = x.clone();
    assert!(!x.insert(63));
    assert_eq!(x, once);
    assert_eq!(x.len(), 1);
    assert_eq!(x.capacity(), 64);
    x.insert(64);
    assert_eq!(x.capacity(), 128);
}

#[test]
fn test_set_algebra_sequence() {
    use alloc::string::ToString;
    let mut x: BitSet = [1, 3, 5].into_iter().collect();
    let y: BitSet = [2, 4, 6].into_iter().collect();
    x.union_with(&y);
    assert_eq!(x.to_string(), "{1 2 3 4 5 6}");
    x.intersect_with(&y);
    assert_eq!(x.to_string(), "{2 4 6}");
    let z: BitSet = [4, 6].into_iter().collect();
    x.difference_with(&z);
    assert_eq!(x.to_string(), "{2}");
}

#[test]
fn test_remove_absent() {
    use alloc::string::ToString;
    let mut y: BitSet = [9, 42, 1000].into_iter().collect();
    let capacity = y.capacity();
    assert!(!y.remove(100));
    assert!(!y.remove(1_000_000));
    assert_eq!(y.capacity(), capacity);
    assert_eq!(y.len(), 3);
    assert_eq!(y.to_string(), "{9 42 1000}");
    assert!(y.remove(42));
    assert!(!y.contains(42));
    assert_eq!(y.len(), 2);
}

#[test]
fn test_remove_trims() {
    let mut x: BitSet = [3, 700].into_iter().collect();
    x.remove(700);
    assert_eq!(x.capacity(), 64);
    assert_canonical(&x);
    x.remove(3);
    assert_eq!(x.capacity(), 0);
    assert!(x.is_empty());
}

#[test]
fn test_emptied_set_equals_new() {
    let mut x: BitSet = [5, 300].into_iter().collect();
    x.intersect_with(&BitSet::from_iter([6, 301]));
    assert!(x.is_empty());
    assert_eq!(x, BitSet::new());
    let mut y: BitSet = [1, 2].into_iter().collect();
    y -= &BitSet::from_iter([1, 2]);
    assert!(y.is_empty());
    assert_eq!(x, y);
}

#[test]
fn test_clone_independent() {
    use alloc::string::ToString;
    let mut y: BitSet = [9, 42, 1000].into_iter().collect();
    let mut z = y.clone();
    y.clear();
    assert_eq!(y.to_string(), "{}");
    assert_eq!(y.len(), 0);
    assert_eq!(y.capacity(), 0);
    assert_eq!(z.to_string(), "{9 42 1000}");
    assert_eq!(z.len(), 3);
    z.insert(1);
    assert!(!y.contains(1));
    y.insert(2);
    assert!(!z.contains(2));
}

#[test]
fn test_union_mismatched_lengths() {
    use alloc::string::ToString;
    let mut short: BitSet = [1].into_iter().collect();
    let long: BitSet = [0, 300].into_iter().collect();
    short.union_with(&long);
    assert_eq!(short.to_string(), "{0 1 300}");
    assert_eq!(short.capacity(), 320);
    let mut long2 = long.clone();
    long2.union_with(&BitSet::from_iter([2]));
    assert_eq!(long2.to_string(), "{0 2 300}");
    assert_eq!(long2.capacity(), 320);
}

#[test]
fn test_intersect_difference_mismatched_lengths() {
    use alloc::string::ToString;
    let long: BitSet = [1, 64, 300].into_iter().collect();
    let short: BitSet = [1, 2].into_iter().collect();
    let mut x = long.clone();
    x.intersect_with(&short);
    assert_eq!(x.to_string(), "{1}");
    assert_canonical(&x);
    let mut x = short.clone();
    x.intersect_with(&long);
    assert_eq!(x.to_string(), "{1}");
    let mut x = long.clone();
    x.difference_with(&short);
    assert_eq!(x.to_string(), "{64 300}");
    let mut x = short.clone();
    x.difference_with(&long);
    assert_eq!(x.to_string(), "{2}");
    let mut x = short.clone();
    x ^= &long;
    assert_eq!(x.to_string(), "{2 64 300}");
}

#[test]
fn test_operators() {
    let a: BitSet = [1, 2, 3].into_iter().collect();
    let b: BitSet = [3, 4].into_iter().collect();
    let mut x = a.clone();
    x |= &b;
    assert_eq!(x, BitSet::from_iter([1, 2, 3, 4]));
    let mut x = a.clone();
    x &= &b;
    assert_eq!(x, BitSet::from_iter([3]));
    let mut x = a.clone();
    x -= &b;
    assert_eq!(x, BitSet::from_iter([1, 2]));
}

#[test]
fn test_debug() {
    use alloc::format;
    let x: BitSet = [70, 2].into_iter().collect();
    assert_eq!(format!("{x:?}"), "{2, 70}");
}

#[test]
fn test_typed_index() {
    struct Node(u16);
    impl From<Node> for usize {
        fn from(n: Node) -> usize {
            n.0 as usize
        }
    }
    let mut s: BitSet<Node> = BitSet::new();
    s.insert(Node(500));
    assert!(s.contains(Node(500)));
    assert!(!s.contains(Node(499)));
    assert!(s.iter().eq([500usize]));
}

#[test]
fn test_matches_btree_set() {
    use alloc::collections::BTreeSet;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn check(s: &BitSet, m: &BTreeSet<usize>) {
        assert_eq!(s.len(), m.len());
        assert_eq!(s.is_empty(), m.is_empty());
        assert!(s.iter().eq(m.iter().copied()));
        assert_canonical(s);
    }

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..100 {
        let mut sets: [(BitSet, BTreeSet<usize>); 2] = Default::default();
        for (s, m) in &mut sets {
            let max = rng.gen_range(1..1000);
            for _ in 0..rng.gen_range(0..60) {
                let x = rng.gen_range(0..max);
                assert_eq!(s.insert(x), m.insert(x));
            }
            for _ in 0..20 {
                let x = rng.gen_range(0..max + 100);
                assert_eq!(s.remove(x), m.remove(&x));
            }
            check(s, m);
        }
        let [(a, ma), (b, mb)] = &sets;

        let mut x = a.clone();
        x.union_with(b);
        check(&x, &ma.union(mb).copied().collect());
        let mut x = a.clone();
        x.intersect_with(b);
        check(&x, &ma.intersection(mb).copied().collect());
        let mut x = a.clone();
        x.difference_with(b);
        check(&x, &ma.difference(mb).copied().collect());
        let mut x = a.clone();
        x.symmetric_difference_with(b);
        check(&x, &ma.symmetric_difference(mb).copied().collect());
    }
}

#[cfg(feature = "serde-1")]
#[test]
fn test_serde_words() {
    let x: BitSet = [1, 64].into_iter().collect();
    let json = serde_json::to_string(&x).unwrap();
    assert_eq!(json, "[2,1]");
    let y: BitSet = serde_json::from_str(&json).unwrap();
    assert_eq!(x, y);
}

#[cfg(feature = "serde-1")]
#[test]
fn test_serde_trims_trailing_zero_words() {
    let x: BitSet = serde_json::from_str("[4,0,0]").unwrap();
    assert_canonical(&x);
    assert_eq!(x.capacity(), 64);
    assert_eq!(x, BitSet::from_iter([2]));

    let empty: BitSet = serde_json::from_str("[0,0]").unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.capacity(), 0);
    assert_eq!(empty, BitSet::new());
}
