//! Attribute macros behind `#[core_async::test]` and `#[core_async::main]`.
//!
//! On native targets the annotated `async fn` is rewritten into a synchronous
//! function driving a current-thread Tokio runtime; on `wasm32` the async body
//! is kept and handed to `wasm_bindgen_test`.
//!
//! `#[core_async::test(start_paused)]` starts the Tokio clock paused so timer
//! heavy code (volume fades) runs instantly and deterministically. It requires
//! the `test-util` feature of `core-async`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, ItemFn, Meta, Token};

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Test)
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Main)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MacroKind {
    Test,
    Main,
}

#[derive(Default)]
struct Options {
    start_paused: bool,
}

fn parse_options(attr: TokenStream, kind: MacroKind) -> syn::Result<Options> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse(attr)?;
    let mut options = Options::default();

    for meta in metas {
        match &meta {
            Meta::Path(path) if path.is_ident("start_paused") && kind == MacroKind::Test => {
                options.start_paused = true;
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    meta,
                    "unsupported core_async attribute argument (expected `start_paused` on tests)",
                ))
            }
        }
    }

    Ok(options)
}

fn expand(attr: TokenStream, item: TokenStream, kind: MacroKind) -> TokenStream {
    let options = match parse_options(attr, kind) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error().into(),
    };

    let input = parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "core_async attribute macros require `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let mut sync_sig = input.sig.clone();
    sync_sig.asyncness = None;
    let async_sig = input.sig.clone();

    let attrs = input.attrs;
    let vis = input.vis;
    let block = input.block;

    let runner: TokenStream2 = if options.start_paused {
        quote!(core_async::runtime::block_on_paused)
    } else {
        quote!(core_async::runtime::block_on)
    };

    let native_marker = match kind {
        MacroKind::Test => quote!(#[test]),
        MacroKind::Main => quote!(),
    };

    let wasm_marker = match kind {
        MacroKind::Test => quote!(#[core_async::test_support::wasm_bindgen_test]),
        MacroKind::Main => quote!(),
    };

    quote! {
        #[cfg(not(target_arch = "wasm32"))]
        #(#attrs)*
        #native_marker
        #vis #sync_sig {
            #runner(async move #block)
        }

        #[cfg(target_arch = "wasm32")]
        #(#attrs)*
        #wasm_marker
        #vis #async_sig #block
    }
    .into()
}
