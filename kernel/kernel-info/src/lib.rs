//! # Kernel build/layout information
//!
//! Compile-time facts about the target shared by the kernel crates. Nothing
//! in here executes; it is constants plus the asserts that keep them honest.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
