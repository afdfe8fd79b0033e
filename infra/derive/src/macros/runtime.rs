use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Rewrites `async fn main() -> Result<..>` into a sync entry point driven by `lvai_runtime`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(input.sig.fn_token, "#[lvai_runtime::main] requires an async fn")
            .to_compile_error();
    }
    if !returns_result(&input.sig.output) {
        return Error::new_spanned(&input.sig.output, "#[lvai_runtime::main] requires a Result return type")
            .to_compile_error();
    }

    let profile = match profile_ctor(args) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #profile;
            let runtime = ::lvai_runtime::build_runtime_with_config(&config)?;
            runtime.block_on(async move #block)
        }
    }
}

fn profile_ctor(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::lvai_runtime::RuntimeConfig::default() });
    }

    let profile: Ident = syn::parse2(args)?;
    match profile.to_string().as_str() {
        "server" => Ok(quote! { ::lvai_runtime::RuntimeConfig::server() }),
        "probe" => Ok(quote! { ::lvai_runtime::RuntimeConfig::probe() }),
        "default" => Ok(quote! { ::lvai_runtime::RuntimeConfig::default() }),
        _ => Err(Error::new_spanned(profile, "unknown runtime profile, use server, probe or default")),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path.path.segments.last().is_some_and(|seg| seg.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}
