//! # Kernel Object Derive
//!
//! This crate provides a derive macro that implements
//! `mcu_model::KernelObject` for the named records of a project model
//! (processes, threads, invocations, ports and endpoints).
//!
//! The trait gives the capability resolver one uniform view over every
//! category: the object kind, its name and, for references, the name of the
//! process it points into.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, parse_macro_input, spanned::Spanned};

/// Derive `mcu_model::KernelObject`.
///
/// - Container: `#[kernel_object(kind = Thread)]` selects the
///   `mcu_model::ObjectKind` variant. Required.
/// - Field: `#[kernel_object(name)]` marks the name field. Defaults to the
///   field called `name`.
/// - Field: `#[kernel_object(target)]` marks the target-process name of a
///   reference. Without it, `target()` returns `None`.
///
/// # Example
///
/// ```ignore
/// use mcu_model_derive::KernelObject;
///
/// #[derive(KernelObject)]
/// #[kernel_object(kind = Port)]
/// struct Port {
///     name: String,
///     #[kernel_object(target)]
///     target: String,
/// }
/// ```
#[proc_macro_derive(KernelObject, attributes(kernel_object))]
pub fn derive_kernel_object(input: TokenStream) -> TokenStream {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = parse_macro_input!(input as DeriveInput);

    let fields = match data {
        Data::Struct(s) => match s.fields {
            Fields::Named(n) => n.named,
            other => {
                return syn::Error::new(other.span(), "KernelObject needs named fields")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new(ident.span(), "KernelObject can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let kind = match container_kind(&attrs) {
        Ok(Some(kind)) => kind,
        Ok(None) => {
            return syn::Error::new(
                ident.span(),
                "missing #[kernel_object(kind = ...)] on the struct",
            )
            .to_compile_error()
            .into();
        }
        Err(e) => return e.to_compile_error().into(),
    };

    let mut name_field = None;
    let mut target_field = None;
    for field in &fields {
        let Some(fname) = &field.ident else { continue };
        let (is_name, is_target) = match field_roles(&field.attrs) {
            Ok(roles) => roles,
            Err(e) => return e.to_compile_error().into(),
        };
        if is_name || (name_field.is_none() && fname == "name") {
            name_field = Some(fname.clone());
        }
        if is_target {
            target_field = Some(fname.clone());
        }
    }

    let Some(name_field) = name_field else {
        return syn::Error::new(ident.span(), "no name field; add #[kernel_object(name)]")
            .to_compile_error()
            .into();
    };

    let target_body = target_field.map_or_else(
        || quote! { ::core::option::Option::None },
        |t| quote! { ::core::option::Option::Some(self.#t.as_str()) },
    );

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::mcu_model::KernelObject for #ident #ty_generics #where_clause {
            const KIND: ::mcu_model::ObjectKind = ::mcu_model::ObjectKind::#kind;

            #[inline]
            fn name(&self) -> &str {
                self.#name_field.as_str()
            }

            #[inline]
            fn target(&self) -> ::core::option::Option<&str> {
                #target_body
            }
        }
    };

    TokenStream::from(expanded)
}

/// Read `kind = Variant` from the container attributes.
fn container_kind(attrs: &[syn::Attribute]) -> syn::Result<Option<Ident>> {
    let mut kind = None;
    for attr in attrs {
        if !attr.path().is_ident("kernel_object") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                kind = Some(meta.value()?.parse::<Ident>()?);
                Ok(())
            } else {
                Err(meta.error("expected `kind = <ObjectKind variant>`"))
            }
        })?;
    }
    Ok(kind)
}

/// Accept `#[kernel_object(name)]` and `#[kernel_object(target)]` on fields.
fn field_roles(attrs: &[syn::Attribute]) -> syn::Result<(bool, bool)> {
    let mut name = false;
    let mut target = false;
    for attr in attrs {
        if !attr.path().is_ident("kernel_object") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = true;
            } else if meta.path.is_ident("target") {
                target = true;
            } else {
                return Err(meta.error("expected `name` or `target`"));
            }
            Ok(())
        })?;
    }
    Ok((name, target))
}
