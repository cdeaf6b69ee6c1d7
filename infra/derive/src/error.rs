use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Type, Variant};

/// Spellings accepted for the `context` slot, whitespace removed.
const CONTEXT_TYPES: [&str; 3] = [
    "Option<Cow<'static,str>>",
    "Option<std::borrow::Cow<'static,str>>",
    "Option<::std::borrow::Cow<'static,str>>",
];

/// A variant as the generated impls see it.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    cfg: Vec<&'a Attribute>,
    has_context: bool,
    source: Option<(&'a Ident, &'a Type)>,
}

impl<'a> ErrorVariant<'a> {
    fn parse(variant: &'a Variant) -> syn::Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                variant,
                "planner_error requires named fields for source/context handling",
            ));
        };

        let mut has_context = false;
        let mut source = None;
        for field in &fields.named {
            let Some(ident) = field.ident.as_ref() else { continue };
            if ident == "context" {
                if !is_context_type(&field.ty) {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "context field must be Option<Cow<'static, str>>",
                    ));
                }
                has_context = true;
            } else if source.is_none() && is_source(ident, &field.attrs) {
                source = Some((ident, &field.ty));
            }
        }

        if source.is_some() && !has_context {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "planner_error requires `context: Option<Cow<'static, str>>` for variants with a source",
            ));
        }

        let cfg = variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).collect();
        Ok(Self { ident: &variant.ident, cfg, has_context, source })
    }

    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }

    /// Match arm filling the context slot in place.
    fn context_arm(&self, name: &Ident) -> Option<TokenStream> {
        let Self { ident, cfg, .. } = self;
        self.has_context
            .then(|| quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), })
    }

    fn kind_arm(&self) -> TokenStream {
        let Self { ident, cfg, .. } = self;
        let kind = snake_case(&ident.to_string());
        quote! { #(#cfg)* Self::#ident { .. } => #kind, }
    }

    /// `From<Source>` plus `.context()` directly on `Result<T, Source>`.
    fn source_impls(&self, name: &Ident, ext: &Ident) -> Option<TokenStream> {
        if self.is_internal() {
            return None;
        }
        let (field, ty) = self.source?;
        let Self { ident, cfg, .. } = self;

        Some(quote! {
            #(#cfg)*
            #[automatically_derived]
            impl From<#ty> for #name {
                #[inline]
                fn from(#field: #ty) -> Self {
                    Self::#ident { #field, context: None }
                }
            }

            #(#cfg)*
            #[automatically_derived]
            impl<T> #ext<T> for ::std::result::Result<T, #ty> {
                #[inline]
                fn context(
                    self,
                    context: impl Into<::std::borrow::Cow<'static, str>>,
                ) -> ::std::result::Result<T, #name> {
                    self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
                }
            }
        })
    }

    /// `From<&'static str>` and `From<String>` landing in `Internal`.
    fn message_impls(&self, name: &Ident) -> TokenStream {
        let cfg = &self.cfg;
        quote! {
            #(#cfg)*
            #[automatically_derived]
            impl From<&'static str> for #name {
                #[inline]
                fn from(message: &'static str) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Borrowed(message), context: None }
                }
            }

            #(#cfg)*
            #[automatically_derived]
            impl From<String> for #name {
                #[inline]
                fn from(message: String) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Owned(message), context: None }
                }
            }
        }
    }
}

pub fn expand(input: DeriveInput) -> TokenStream {
    expand_enum(&input).unwrap_or_else(syn::Error::into_compile_error)
}

fn expand_enum(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "planner_error can only be applied to enums"));
    };

    let name = &input.ident;
    let ext = format_ident!("{name}Ext");
    let variants = data.variants.iter().map(ErrorVariant::parse).collect::<syn::Result<Vec<_>>>()?;

    let derives = missing_derives(input);
    let context_arms = variants.iter().filter_map(|v| v.context_arm(name));
    let kind_arms = variants.iter().map(ErrorVariant::kind_arm);
    let source_impls = variants.iter().filter_map(|v| v.source_impls(name, &ext));
    let message_impls =
        variants.iter().find(|v| v.is_internal()).map(|v| v.message_impls(name));

    Ok(quote! {
        #[allow(non_shorthand_field_patterns)]
        #derives
        #input

        pub trait #ext<T> {
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut error| {
                    match &mut error {
                        #( #context_arms )*
                        _ => {}
                    }
                    error
                })
            }
        }

        #(#source_impls)*
        #message_impls

        #[automatically_derived]
        impl #name {
            /// Stable `snake_case` name of the variant, suitable as a log field.
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    #( #kind_arms )*
                }
            }
        }

        #[allow(dead_code)]
        fn format_context(
            context: &Option<::std::borrow::Cow<'static, str>>,
        ) -> ::std::borrow::Cow<'static, str> {
            context.as_ref().map_or(::std::borrow::Cow::Borrowed(""), |c| {
                ::std::borrow::Cow::Owned(format!(" ({c})"))
            })
        }
    })
}

/// `Debug` and `thiserror::Error`, unless the enum already derives them.
fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                present.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    let mut wanted = Vec::new();
    if !present.contains("Debug") {
        wanted.push(quote! { Debug });
    }
    if !present.contains("Error") {
        wanted.push(quote! { ::thiserror::Error });
    }
    if wanted.is_empty() { TokenStream::new() } else { quote! { #[derive(#(#wanted),*)] } }
}

fn is_source(ident: &Ident, attrs: &[Attribute]) -> bool {
    ident == "source"
        || attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
}

fn is_context_type(ty: &Type) -> bool {
    let rendered: String =
        ty.to_token_stream().to_string().chars().filter(|c| !c.is_whitespace()).collect();
    CONTEXT_TYPES.contains(&rendered.as_str())
}

fn snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
