//! Code generation for `register_block!`.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

use crate::parse::{Register, RegisterBlock};

/// Emits the register block struct and its accessor `impl`.
pub fn generate(block: &RegisterBlock) -> TokenStream {
    let RegisterBlock {
        attrs,
        vis,
        name,
        registers,
    } = block;

    let accessors = registers.iter().map(|reg| accessors(vis, reg));

    quote! {
        #(#attrs)*
        #[derive(Debug)]
        #vis struct #name {
            base: usize,
        }

        impl #name {
            /// Wraps the register window mapped at `base`.
            ///
            /// # Safety
            ///
            /// `base` must point to a mapped, uncached MMIO window that covers
            /// every register of this block and stays mapped for as long as
            /// the returned value is used.
            #[must_use]
            #vis const unsafe fn new(base: VirtAddr) -> Self {
                Self { base: base.as_usize() }
            }

            #(#accessors)*
        }
    }
}

fn accessors(vis: &syn::Visibility, reg: &Register) -> TokenStream {
    let Register {
        attrs,
        offset,
        width,
        access,
        name,
        flags,
        ..
    } = reg;

    let raw = width.type_ident();
    let offset = Literal::usize_unsuffixed(*offset);
    let value_ty = match flags {
        Some(ty) => quote! { #ty },
        None => quote! { #raw },
    };

    let reader = if access.readable() {
        let convert = match flags {
            Some(ty) => quote! { <#ty>::from_bits_retain(raw) },
            None => quote! { raw },
        };
        quote! {
            #(#attrs)*
            #[inline]
            #[must_use]
            #vis fn #name(&self) -> #value_ty {
                // SAFETY: `new` requires the window to cover this register.
                let raw = unsafe {
                    ::core::ptr::read_volatile((self.base + #offset) as *const #raw)
                };
                #convert
            }
        }
    } else {
        TokenStream::new()
    };

    let writer = if access.writable() {
        let setter = format_ident!("set_{}", name);
        let doc = if access.readable() {
            let text = format!(" Writes the `{name}` register.");
            quote! { #[doc = #text] }
        } else {
            quote! { #(#attrs)* }
        };
        let convert = match flags {
            Some(_) => quote! { value.bits() },
            None => quote! { value },
        };
        quote! {
            #doc
            #[inline]
            #vis fn #setter(&self, value: #value_ty) {
                let raw: #raw = #convert;
                // SAFETY: `new` requires the window to cover this register.
                unsafe {
                    ::core::ptr::write_volatile((self.base + #offset) as *mut #raw, raw);
                }
            }
        }
    } else {
        TokenStream::new()
    };

    quote! {
        #reader
        #writer
    }
}
