#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod bit_set;
mod words;

pub use bit_set::{BitSet, Iter};
