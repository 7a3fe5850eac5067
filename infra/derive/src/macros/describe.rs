use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Fields, LitStr, Path, Token};

/// Arguments of `#[descriptive(...)]`: an optional format string and an
/// optional `crate = path` naming where `Descriptive` lives.
#[derive(Default)]
struct Options {
    template: Option<LitStr>,
    krate: Option<Path>,
}

enum Arg {
    Template(LitStr),
    Crate(Path),
}

impl Parse for Arg {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return input.parse().map(Self::Template);
        }
        input.parse::<Token![crate]>()?;
        input.parse::<Token![=]>()?;
        Path::parse_mod_style(input).map(Self::Crate)
    }
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let options = options(input)?;
    let krate = options.krate.map_or_else(|| quote! { ::stackline_callstack }, |path| quote! { #path });

    let body = match options.template {
        None => {
            let label = name.to_string();
            quote! { #krate::Description::new(#label) }
        },
        Some(template) => {
            let bindings = field_bindings(input, &template)?;
            quote! {
                #[allow(unused_variables)]
                let #bindings = self;
                #krate::Description::new(format!(#template))
            }
        },
    };

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #krate::Descriptive for #name #ty_generics #where_clause {
            fn description(&self) -> #krate::Description {
                #body
            }
        }
    })
}

fn options(input: &DeriveInput) -> syn::Result<Options> {
    let mut options = Options::default();
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("descriptive")) {
        let args = attr.parse_args_with(Punctuated::<Arg, Token![,]>::parse_terminated)?;
        for arg in args {
            match arg {
                Arg::Template(template) if options.template.is_none() => {
                    options.template = Some(template);
                },
                Arg::Crate(path) if options.krate.is_none() => options.krate = Some(path),
                Arg::Template(template) => {
                    return Err(syn::Error::new_spanned(template, "duplicate descriptive template"));
                },
                Arg::Crate(path) => {
                    return Err(syn::Error::new_spanned(path, "duplicate `crate = ...` path"));
                },
            }
        }
    }
    Ok(options)
}

/// Destructuring pattern that brings every named field into scope.
fn field_bindings(input: &DeriveInput, template: &LitStr) -> syn::Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            template,
            "#[descriptive(\"...\")] is only supported on structs",
        ));
    };

    match &data.fields {
        Fields::Named(fields) => {
            let idents = fields.named.iter().filter_map(|f| f.ident.as_ref());
            Ok(quote! { Self { #(#idents),* } })
        },
        Fields::Unit => Ok(quote! { Self }),
        Fields::Unnamed(_) => Err(syn::Error::new_spanned(
            template,
            "#[descriptive(\"...\")] requires named fields",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_type_name_fallback() {
        let input: DeriveInput = parse_quote! { struct Bootstrap; };
        let output = expand_derive(input).to_string();
        assert!(output.contains("\"Bootstrap\""));
        assert!(output.contains("Descriptive for Bootstrap"));
    }

    #[test]
    fn test_template_binds_fields() {
        let input: DeriveInput = parse_quote! {
            #[descriptive("load {id}")]
            struct Load { id: u64, name: String }
        };
        let output = expand_derive(input).to_string();
        assert!(output.contains("Self { id , name }"));
        assert!(output.contains("format !"));
    }

    #[test]
    fn test_template_rejected_on_tuple_struct() {
        let input: DeriveInput = parse_quote! {
            #[descriptive("load {0}")]
            struct Load(u64);
        };
        assert!(expand_derive(input).to_string().contains("compile_error"));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let input: DeriveInput = parse_quote! {
            #[descriptive("a")]
            #[descriptive("b")]
            struct Load;
        };
        assert!(expand_derive(input).to_string().contains("duplicate"));
    }

    #[test]
    fn test_crate_path_override() {
        let input: DeriveInput = parse_quote! {
            #[descriptive(crate = stackline::callstack)]
            #[descriptive("boot {stage}")]
            struct Boot { stage: u8 }
        };
        let output = expand_derive(input).to_string();
        assert!(output.contains("stackline :: callstack :: Descriptive for Boot"));
        assert!(!output.contains("stackline_callstack"));
    }

    #[test]
    fn test_template_and_crate_in_one_attribute() {
        let input: DeriveInput = parse_quote! {
            #[descriptive("boot", crate = ::stackline::callstack)]
            struct Boot;
        };
        let output = expand_derive(input).to_string();
        assert!(output.contains(":: stackline :: callstack :: Description :: new (format !"));
    }
}
