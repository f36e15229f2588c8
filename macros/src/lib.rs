use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, ItemFn};

/// Test attribute shared by every rxcore test.
///
/// - On a sync fn it expands to `#[test]`.
/// - On an async fn the body runs on a current-thread tokio runtime, inside a
///   `LocalSet` so `spawn_local` works, with tokio time paused: sleeping
///   advances the clock straight to the next timer.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);
  let args = proc_macro2::TokenStream::from(attr);
  if !args.is_empty() {
    return TokenStream::from(
      syn::Error::new(args.span(), "rxcore_macro::test takes no arguments").to_compile_error(),
    );
  }

  if input.sig.asyncness.is_none() {
    return TokenStream::from(quote! {
      #[test]
      #input
    });
  }

  let ItemFn { attrs, vis, sig, block } = input;
  let expanded = quote! {
    #[tokio::test(flavor = "current_thread", start_paused = true)]
    #(#attrs)*
    #vis #sig {
      tokio::task::LocalSet::new()
        .run_until(async move #block)
        .await
    }
  };

  TokenStream::from(expanded)
}
