//! Procedural macros for commanderize.
//!
//! * `#[derive(Record)]` - generates the `Reflect` table of a struct
//! * `#[behaviors]` - generates the `Behaviors` method table of an `impl` block
//!
//! Generated code refers to the runtime crate as `::commanderize`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, FnArg, ImplItem, ItemImpl, Lit, Meta,
    Type, Visibility, parse_macro_input,
};

/// Field types with a flag adapter. Matched on the last path segment.
const SUPPORTED: &[&str] = &[
    "bool", "i32", "i64", "u32", "u64", "f64", "String", "Duration",
];

/// Derives `commanderize::Reflect` for a struct with named fields.
///
/// Every field is listed in declaration order. Only `pub` fields are bound to
/// flags. A field may carry one annotation:
///
/// ```ignore
/// #[derive(Record)]
/// pub struct Server {
///     #[cmd = "Port to listen on"]
///     pub port: u32,
///     #[cmd = "-"]
///     pub token: String,   // never a flag
/// }
/// ```
///
/// Methods come from the type's `Behaviors` impl, normally generated by
/// `#[behaviors]`.
///
/// Whether a field can become a flag is decided from the type as written,
/// by its last path segment (`u32`, `std::time::Duration`). A type alias such
/// as `type Port = u32` is therefore reported as unsupported when the record
/// is bound. An unrelated type that happens to be named `String` or
/// `Duration` fails to compile with a missing `FlagType` impl.
#[proc_macro_derive(Record, attributes(cmd))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Generates `commanderize::Behaviors` from an inherent `impl` block.
///
/// Every method taking `&self` or `&mut self` is listed with its visibility
/// and argument count. Public, synchronous, non-generic methods without
/// further arguments can be dispatched; their return values are dropped.
///
/// ```ignore
/// #[behaviors]
/// impl Server {
///     pub fn start(&mut self) { /* ... */ }
/// }
/// ```
///
/// Only one `#[behaviors]` block per type is supported. Each block emits its
/// own `Behaviors` impl, so a second annotated block is a conflicting-impl
/// error. Keep every dispatchable method in the same block; helpers can live
/// in plain `impl` blocks.
#[proc_macro_attribute]
pub fn behaviors(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        let args = TokenStream2::from(args);
        return syn::Error::new_spanned(args, "#[behaviors] takes no arguments")
            .into_compile_error()
            .into();
    }
    let item = parse_macro_input!(input as ItemImpl);
    expand_behaviors(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_record(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "Record can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ident,
            "Record can only be derived for structs with named fields",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let type_name = ident.unraw().to_string();
    let mut infos = Vec::new();
    let mut getters = Vec::new();
    let mut setters = Vec::new();

    for field in &named.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let name = field_ident.unraw().to_string();
        let ty = &field.ty;
        let public = matches!(field.vis, Visibility::Public(_));
        let tag = match cmd_tag(&field.attrs)? {
            Some(tag) => quote!(::core::option::Option::Some(#tag)),
            None => quote!(::core::option::Option::None),
        };

        let field_type = if is_supported(ty) {
            getters.push(quote! {
                #name => ::core::option::Option::Some(
                    <#ty as ::commanderize::FlagType>::to_value(&self.#field_ident)
                ),
            });
            setters.push(quote! {
                #name => match <#ty as ::commanderize::FlagType>::from_value(value) {
                    ::core::option::Option::Some(v) => {
                        self.#field_ident = v;
                        true
                    }
                    ::core::option::Option::None => false,
                },
            });
            quote!(<#ty as ::commanderize::FlagType>::TYPE)
        } else {
            let written = ty.to_token_stream().to_string().replace(' ', "");
            quote!(::commanderize::FieldType::Unsupported(#written))
        };

        infos.push(quote! {
            ::commanderize::FieldInfo {
                name: #name,
                ty: #field_type,
                tag: #tag,
                public: #public,
            }
        });
    }

    Ok(quote! {
        impl ::commanderize::Reflect for #ident {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn kind(&self) -> ::commanderize::TypeKind {
                ::commanderize::TypeKind::Record
            }

            fn fields(&self) -> &'static [::commanderize::FieldInfo] {
                const FIELDS: &[::commanderize::FieldInfo] = &[#(#infos),*];
                FIELDS
            }

            fn field(&self, name: &str) -> ::core::option::Option<::commanderize::Value> {
                match name {
                    #(#getters)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_field(&mut self, name: &str, value: ::commanderize::Value) -> bool {
                match name {
                    #(#setters)*
                    _ => {
                        let _ = value;
                        false
                    }
                }
            }

            fn methods(&self) -> &'static [::commanderize::MethodInfo] {
                <Self as ::commanderize::Behaviors>::METHODS
            }

            fn call(&mut self, method: &str) -> bool {
                <Self as ::commanderize::Behaviors>::call(self, method)
            }
        }
    })
}

fn expand_behaviors(item: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[behaviors] goes on an inherent impl block",
        ));
    }

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let mut infos = Vec::new();
    let mut arms = Vec::new();

    for impl_item in &item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let sig = &method.sig;
        let Some(FnArg::Receiver(receiver)) = sig.inputs.first() else {
            continue;
        };
        if !matches!(*receiver.ty, Type::Reference(_)) {
            continue;
        }

        let name = sig.ident.unraw().to_string();
        let public = matches!(method.vis, Visibility::Public(_));
        let arity = sig.inputs.len() - 1;
        infos.push(quote! {
            ::commanderize::MethodInfo {
                name: #name,
                public: #public,
                arity: #arity,
            }
        });

        let callable = public
            && arity == 0
            && sig.asyncness.is_none()
            && sig.generics.params.is_empty();
        if callable {
            let fn_ident = &sig.ident;
            arms.push(quote! {
                #name => {
                    let _ = self.#fn_ident();
                    true
                }
            });
        }
    }

    Ok(quote! {
        #item

        impl #impl_generics ::commanderize::Behaviors for #self_ty #where_clause {
            const METHODS: &'static [::commanderize::MethodInfo] = &[#(#infos),*];

            fn call(&mut self, method: &str) -> bool {
                match method {
                    #(#arms)*
                    _ => false,
                }
            }
        }
    })
}

/// Reads `#[cmd = "..."]`.
fn cmd_tag(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("cmd") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(tag), ..
            }) = &nv.value
        {
            return Ok(Some(tag.value()));
        }
        return Err(syn::Error::new_spanned(
            attr,
            "expected #[cmd = \"help text\"] or #[cmd = \"-\"]",
        ));
    }
    Ok(None)
}

fn is_supported(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() {
        return false;
    }
    path.path.segments.last().is_some_and(|last| {
        last.arguments.is_none() && SUPPORTED.contains(&last.ident.to_string().as_str())
    })
}
