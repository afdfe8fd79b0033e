#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the LotteryVision crates: error enums with context,
//! feature slice handles, API models and handlers, and the runtime entry point.
//!
//! Examples below are `ignore`d since they reference crates this proc-macro crate
//! cannot depend on.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns an `async fn main` into a sync `main` that builds a tuned Tokio runtime.
///
/// Profiles: `server` (multi-thread, sized to available parallelism), `probe`
/// (current-thread, used by the container health check) and `default`.
///
/// ```rust,ignore
/// #[lvai_runtime::main(server)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares a request or response DTO.
///
/// Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` when missing,
/// applies `rename_all = "snake_case"` and `deny_unknown_fields` unless told otherwise.
///
/// ```rust,ignore
/// #[api_model(deny_unknown_fields = false)]
/// pub struct BalanceResponse {
///     pub balance: i64,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Documents an axum handler through `utoipa::path`, forwarding every argument.
///
/// ```rust,ignore
/// #[api_handler(get, path = "/balance", responses((status = OK, body = BalanceResponse)), tag = "credits")]
/// pub async fn balance(user: CurrentUser) -> ApiResult<BalanceResponse> { .. }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Builds a `thiserror` enum with a companion `<Name>Ext` context trait.
///
/// Every variant uses named fields. Variants with a `source` field (or a field
/// marked `#[source]`/`#[from]`) must carry `context: Option<Cow<'static, str>>`
/// and get a `From<Source>` impl. An `Internal { message, context }` variant
/// also receives `From<&'static str>` and `From<String>`.
///
/// ```rust,ignore
/// #[lvai_error]
/// pub enum CreditsError {
///     #[error("Database error{}: {source}", format_context(.context))]
///     Database { source: DatabaseError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn lvai_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Turns a struct into a feature slice handle registered in the kernel state.
///
/// `struct Credits { .. }` becomes `CreditsInner { .. }` plus an `Arc` backed
/// `Credits` that derefs to it and implements `FeatureSlice`.
#[proc_macro_attribute]
pub fn lvai_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
