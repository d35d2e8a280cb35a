// vim: tw=80
use super::*;

use syn::{
    FnArg,
    ItemTrait,
    Pat,
    PatIdent,
    ReturnType,
    Signature,
    TraitItem,
    Type,
    parse2,
};

pub(crate) fn do_forward(attrs: TokenStream, input: TokenStream)
    -> TokenStream
{
    if !attrs.is_empty() {
        return syn::Error::new(attrs.span(),
            "#[forward] does not take any arguments")
            .to_compile_error();
    }
    let item: ItemTrait = match parse2(input) {
        Ok(item) => item,
        Err(e) => return e.to_compile_error()
    };
    gen_impl(&item).unwrap_or_else(syn::Error::into_compile_error)
}

/// Generate `impl Trait for ::dynmock::Mock`
fn gen_impl(item: &ItemTrait) -> syn::Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new(item.generics.span(),
            "dynmock cannot forward generic traits"));
    }
    let mut methods = Vec::new();
    for ti in item.items.iter() {
        match ti {
            TraitItem::Fn(f) => methods.push(gen_method(&f.sig)?),
            TraitItem::Type(t) => {
                return Err(syn::Error::new(t.span(),
                    "dynmock cannot forward traits with associated types"));
            },
            TraitItem::Const(c) if c.default.is_none() => {
                return Err(syn::Error::new(c.span(),
                    "dynmock cannot forward associated constants without defaults"));
            },
            _ => ()    // Nothing to forward
        }
    }
    let ident = &item.ident;
    let unsafety = &item.unsafety;
    Ok(quote!(
        #unsafety impl #ident for ::dynmock::Mock {
            #(#methods)*
        }
    ))
}

/// Generate a method that sends its own name and arguments to the mock
fn gen_method(sig: &Signature) -> syn::Result<TokenStream> {
    if let Some(a) = &sig.asyncness {
        return Err(syn::Error::new(a.span(),
            "dynmock cannot forward async methods"));
    }
    if let Some(v) = &sig.variadic {
        return Err(syn::Error::new(v.span(),
            "dynmock cannot forward variadic methods"));
    }
    let has_type_params = sig.generics.params.iter()
        .any(|p| !matches!(p, syn::GenericParam::Lifetime(_)));
    if has_type_params {
        return Err(syn::Error::new(sig.generics.span(),
            "dynmock cannot forward generic methods"));
    }

    let mut sig = sig.clone();
    let mut has_receiver = false;
    let mut values = Vec::new();
    for (i, fn_arg) in sig.inputs.iter_mut().enumerate() {
        match fn_arg {
            FnArg::Receiver(r) => {
                if r.reference.is_none() {
                    return Err(syn::Error::new(r.span(),
                        "dynmock can only forward methods that take &self or &mut self"));
                }
                has_receiver = true;
            },
            FnArg::Typed(pt) => {
                // Argument patterns may be anything, so rename them all
                let ident = format_ident!("arg{}", i);
                *pt.pat = Pat::Ident(PatIdent {
                    attrs: Vec::new(),
                    by_ref: None,
                    mutability: None,
                    ident: ident.clone(),
                    subpat: None
                });
                let value = match pt.ty.as_ref() {
                    Type::Reference(_) => quote!(
                        ::dynmock::Value::new(
                            ::std::borrow::ToOwned::to_owned(&*#ident))
                    ),
                    Type::ImplTrait(t) => {
                        return Err(syn::Error::new(t.span(),
                            "dynmock cannot forward impl Trait arguments"));
                    },
                    _ => quote!(::dynmock::Value::new(#ident))
                };
                values.push(value);
            }
        }
    }
    if !has_receiver {
        return Err(syn::Error::new(sig.ident.span(),
            "dynmock cannot forward methods without a self receiver"));
    }

    let message = sig.ident.to_string();
    let args = quote!(::std::vec![#(#values),*]);
    let body = match &sig.output {
        ReturnType::Type(_, ty) if !is_unit(ty) => {
            match ty.as_ref() {
                Type::Reference(r) => {
                    return Err(syn::Error::new(r.span(),
                        "dynmock cannot forward methods that return references"));
                },
                Type::ImplTrait(t) => {
                    return Err(syn::Error::new(t.span(),
                        "dynmock cannot forward methods that return impl Trait"));
                },
                _ => ()
            }
            quote!(
                match ::dynmock::Mock::invoke_as::<#ty>(self, #message, #args) {
                    Ok(r) => r,
                    Err(e) => panic!("{}", e)
                }
            )
        },
        _ => quote!(
            if let Err(e) = ::dynmock::Mock::invoke(self, #message, #args) {
                panic!("{}", e)
            }
        )
    };
    Ok(quote!(#sig { #body }))
}

/// Is this type `()`?
fn is_unit(ty: &Type) -> bool {
    match ty {
        Type::Tuple(tt) => tt.elems.is_empty(),
        Type::Paren(tp) => is_unit(&tp.elem),
        _ => false
    }
}
