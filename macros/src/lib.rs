mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first doc comment line becomes the operation summary and the rest its description.
/// `response(status = .., shape = "..", description = "..")` documents a success response and
/// `error(status = .., description = "..")` documents an error response.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}
