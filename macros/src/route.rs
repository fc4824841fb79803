use darling::{ast, FromMeta};
use proc_macro::TokenStream;
use quote::{format_ident, quote};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
	#[darling(multiple)]
	error: Vec<ErrorArgs>,
}

#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

/// An error status the handler can answer with. The body is always
/// the crate's `ErrorResponse`.
#[derive(FromMeta)]
struct ErrorArgs {
	status: syn::LitInt,
	description: String,
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let function = syn::parse_macro_input!(input as syn::ItemFn);
	let Some((summary, description)) = split_doc_comment(&function.attrs) else {
		return syn::Error::new(
			function.sig.ident.span(),
			"route handlers need a doc comment with a summary line followed by a description",
		)
		.into_compile_error()
		.into();
	};

	let operation_id = function.sig.ident.to_string();
	let fn_name = format_ident!("{}_docs", function.sig.ident);
	let fn_vis = &function.vis;

	let tags = args.tag.iter();
	let responses = args.response.into_iter().map(|response| {
		let status = response.status;
		let shape = response.shape.map_or_else(|| quote!(()), |x| quote!(#x));

		match response.description {
			Some(description) => quote! {
				.response_with::<#status, #shape, _>(|res| res.description(#description))
			},
			None => quote! {
				.response::<#status, #shape>()
			},
		}
	});
	let errors = args.error.into_iter().map(|error| {
		let status = error.status;
		let description = error.description;

		quote::quote_spanned! {status.span()=>
			.response_with::<#status, crate::extract::Json<crate::error::ErrorResponse<'static>>, _>(
				|res| res.description(#description)
			)
		}
	});

	quote! {
		#function

		#fn_vis fn #fn_name(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.id(#operation_id)
				.summary(#summary)
				.description(#description)
				#(
					.tag(#tags)
				)*
				#(
					#responses
				)*
				#(
					#errors
				)*
		}
	}
	.into()
}

/// Splits the doc comment into its first line (the summary) and the
/// remaining lines joined with spaces (the description).
fn split_doc_comment(attrs: &[syn::Attribute]) -> Option<(String, String)> {
	let lines = attrs
		.iter()
		.filter(|attr| attr.path().is_ident("doc"))
		.filter_map(|attr| match &attr.meta {
			syn::Meta::NameValue(syn::MetaNameValue {
				value: syn::Expr::Lit(syn::ExprLit {
					lit: syn::Lit::Str(literal),
					..
				}),
				..
			}) => Some(literal.value().trim().to_owned()),
			_ => None,
		})
		.filter(|line| !line.is_empty())
		.collect::<Vec<_>>();

	let (summary, rest) = lines.split_first()?;

	if rest.is_empty() {
		return None;
	}

	Some((summary.clone(), rest.join(" ")))
}
