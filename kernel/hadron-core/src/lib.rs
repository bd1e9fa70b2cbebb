//! Core library for Hadron OS, providing address types, logging, compile-time
//! configuration and locking primitives shared by the kernel and its drivers.

#![cfg_attr(not(test), no_std)]

pub mod addr;
pub mod config;
pub mod log;
pub mod sync;
