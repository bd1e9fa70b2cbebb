//! Proc-macro crate for the `register_block!` MMIO register DSL.
//!
//! Turns a declarative register table into a struct that wraps the mapped base
//! address and exposes one volatile accessor per register. Constructing the
//! struct is the single `unsafe` step; every generated accessor is safe.

mod codegen;
mod parse;

use proc_macro::TokenStream;
use syn::parse_macro_input;

use crate::parse::RegisterBlock;

/// Generates a typed MMIO register block struct with safe accessors.
///
/// # Syntax
///
/// ```ignore
/// register_block! {
///     /// Doc comment for the struct.
///     pub StructName {
///         /// Doc comment for the register.
///         [offset; width; access_mode] name => OptionalBitflagsType,
///     }
/// }
/// ```
///
/// - `offset`: byte offset from the base, naturally aligned for `width`
/// - `width`: `u8`, `u16`, `u32`, or `u64`
/// - `access_mode`: `ro` (read-only), `wo` (write-only) or `rw` (read-write)
/// - `=> Type`: optional flags type providing `from_bits_retain` and `bits`
///
/// # Generated Code
///
/// - `unsafe const fn new(base: VirtAddr) -> Self`; `VirtAddr` (from
///   `hadron_core::addr`) must be in scope at the invocation site
/// - `ro`/`rw`: `fn name(&self) -> Type`
/// - `wo`/`rw`: `fn set_name(&self, value: Type)`
///
/// # Example
///
/// ```ignore
/// use hadron_core::addr::VirtAddr;
/// use hadron_mmio::register_block;
///
/// register_block! {
///     /// PCH thermal sensor registers.
///     pub PchThermalRegs {
///         /// Catastrophic trip threshold.
///         [0x10; u16; rw] ctt,
///         /// Sensor enable and lock.
///         [0x08; u8; rw] tsel => Tsel,
///     }
/// }
/// ```
#[proc_macro]
pub fn register_block(input: TokenStream) -> TokenStream {
    let block = parse_macro_input!(input as RegisterBlock);
    match block.validate() {
        Ok(()) => codegen::generate(&block).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
