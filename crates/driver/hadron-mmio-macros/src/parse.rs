//! Parsing logic for the `register_block!` input.

use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Ident, LitInt, Token, Type, Visibility};

/// Access width of a single register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    U8,
    U16,
    U32,
    U64,
}

impl Width {
    /// The primitive integer type used for volatile access.
    pub fn type_ident(self) -> Ident {
        match self {
            Self::U8 => Ident::new("u8", Span::call_site()),
            Self::U16 => Ident::new("u16", Span::call_site()),
            Self::U32 => Ident::new("u32", Span::call_site()),
            Self::U64 => Ident::new("u64", Span::call_site()),
        }
    }

    /// Size of the register in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }
}

/// Which accessors a register gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

/// One `[offset; width; access] name => Type` line.
pub struct Register {
    pub attrs: Vec<Attribute>,
    pub offset: usize,
    pub offset_span: Span,
    pub width: Width,
    pub access: Access,
    pub name: Ident,
    pub flags: Option<Type>,
}

impl Parse for Register {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;

        let spec;
        syn::bracketed!(spec in input);

        let offset_lit: LitInt = spec.parse()?;
        if !offset_lit.suffix().is_empty() {
            return Err(syn::Error::new(
                offset_lit.span(),
                "register offsets must be unsuffixed integer literals",
            ));
        }
        let offset = offset_lit.base10_parse::<usize>()?;
        spec.parse::<Token![;]>()?;

        let width_ident: Ident = spec.parse()?;
        let width = match width_ident.to_string().as_str() {
            "u8" => Width::U8,
            "u16" => Width::U16,
            "u32" => Width::U32,
            "u64" => Width::U64,
            _ => {
                return Err(syn::Error::new(
                    width_ident.span(),
                    "expected one of: u8, u16, u32, u64",
                ));
            }
        };
        spec.parse::<Token![;]>()?;

        let access_ident: Ident = spec.parse()?;
        let access = match access_ident.to_string().as_str() {
            "ro" => Access::ReadOnly,
            "wo" => Access::WriteOnly,
            "rw" => Access::ReadWrite,
            _ => {
                return Err(syn::Error::new(
                    access_ident.span(),
                    "expected one of: ro, wo, rw",
                ));
            }
        };

        if !spec.is_empty() {
            return Err(spec.error("unexpected tokens after access mode"));
        }

        let name: Ident = input.parse()?;

        let flags = if input.peek(Token![=>]) {
            input.parse::<Token![=>]>()?;
            Some(input.parse()?)
        } else {
            None
        };

        Ok(Self {
            attrs,
            offset,
            offset_span: offset_lit.span(),
            width,
            access,
            name,
            flags,
        })
    }
}

/// The whole `register_block!` invocation.
pub struct RegisterBlock {
    pub attrs: Vec<Attribute>,
    pub vis: Visibility,
    pub name: Ident,
    pub registers: Vec<Register>,
}

impl Parse for RegisterBlock {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;

        let body;
        syn::braced!(body in input);

        let mut registers = Vec::new();
        while !body.is_empty() {
            registers.push(body.parse::<Register>()?);
            // Consume trailing comma if present.
            if !body.is_empty() {
                body.parse::<Token![,]>()?;
            }
        }

        if !input.is_empty() {
            return Err(input.error("unexpected tokens after register block"));
        }

        Ok(Self {
            attrs,
            vis,
            name,
            registers,
        })
    }
}

impl RegisterBlock {
    /// Rejects misaligned offsets and duplicate register names.
    pub fn validate(&self) -> syn::Result<()> {
        for (i, reg) in self.registers.iter().enumerate() {
            if reg.offset % reg.width.bytes() != 0 {
                return Err(syn::Error::new(
                    reg.offset_span,
                    format!(
                        "offset {:#x} is not aligned to the {}-byte register width",
                        reg.offset,
                        reg.width.bytes()
                    ),
                ));
            }
            if self.registers[..i].iter().any(|other| other.name == reg.name) {
                return Err(syn::Error::new(
                    reg.name.span(),
                    format!("register `{}` is declared more than once", reg.name),
                ));
            }
        }
        Ok(())
    }
}
