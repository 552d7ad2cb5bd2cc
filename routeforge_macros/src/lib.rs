//! `#[controller]` attribute for routeforge.
//!
//! ```rust,ignore
//! #[derive(Default)]
//! pub struct UserController {
//!     base: ControllerBase,
//! }
//!
//! #[controller("api/user", context = base)]
//! #[middleware(SetHeader("X-Service", "users"), Tracing)]
//! impl UserController {
//!     #[route(GET, "{id}")]
//!     #[middleware(BearerAuth("secret"))]
//!     pub fn get_user(&self, id: u64) -> Response { ... }
//!
//!     #[route(POST)]
//!     #[route(PUT, "{id}")]
//!     pub fn save(&mut self) -> Result<Response, MyError> { ... }
//! }
//! ```
//!
//! `#[middleware]` on the impl block must come after `#[controller]`.
//! `#[route]` defaults to `GET` and an empty pattern. Every typed parameter of
//! a routed method is bound to the path capture of the same name.

use proc_macro::TokenStream;
use proc_macro2::{Literal, Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{
    parenthesized, parse_macro_input, Attribute, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl,
    Lit, LitStr, Meta, Pat, Path, Result as SynResult, Token, Type, Visibility,
};

const METHODS: [(&str, &str); 7] = [
    ("GET", "Get"),
    ("POST", "Post"),
    ("PUT", "Put"),
    ("DELETE", "Delete"),
    ("HEAD", "Head"),
    ("PATCH", "Patch"),
    ("OPTIONS", "Options"),
];

struct ControllerArgs {
    base: Option<LitStr>,
    context: Option<Ident>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut args = ControllerArgs {
            base: None,
            context: None,
        };
        while !input.is_empty() {
            if input.peek(LitStr) {
                args.base = Some(input.parse()?);
            } else {
                let key: Ident = input.parse()?;
                if key != "context" {
                    return Err(syn::Error::new(key.span(), format!("unexpected argument {key}")));
                }
                input.parse::<Token![=]>()?;
                args.context = Some(input.parse()?);
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

struct RouteArgs {
    method: Ident,
    path: String,
}

impl Parse for RouteArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut method = Ident::new("GET", Span::call_site());
        let mut path = String::new();
        if input.peek(Ident) {
            method = input.parse()?;
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        if input.peek(LitStr) {
            path = input.parse::<LitStr>()?.value();
        }
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        Ok(RouteArgs { method, path })
    }
}

enum ArgLit {
    Str(LitStr),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Parse for ArgLit {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let negative = input.peek(Token![-]);
        if negative {
            input.parse::<Token![-]>()?;
        }
        let lit: Lit = input.parse()?;
        match lit {
            Lit::Int(i) => {
                let value = i.base10_parse::<i64>()?;
                Ok(ArgLit::Int(if negative { -value } else { value }))
            }
            Lit::Float(f) => {
                let value = f.base10_parse::<f64>()?;
                Ok(ArgLit::Float(if negative { -value } else { value }))
            }
            Lit::Str(s) if !negative => Ok(ArgLit::Str(s)),
            Lit::Bool(b) if !negative => Ok(ArgLit::Bool(b.value)),
            other => Err(syn::Error::new(
                other.span(),
                "middleware arguments must be string, integer, float or bool literals",
            )),
        }
    }
}

impl ArgLit {
    fn tokens(&self) -> TokenStream2 {
        match self {
            ArgLit::Str(s) => {
                quote! { ::routeforge::MiddlewareArg::Str(::std::string::String::from(#s)) }
            }
            ArgLit::Int(i) => {
                let lit = Literal::i64_suffixed(*i);
                quote! { ::routeforge::MiddlewareArg::Int(#lit) }
            }
            ArgLit::Float(f) => {
                let lit = Literal::f64_suffixed(*f);
                quote! { ::routeforge::MiddlewareArg::Float(#lit) }
            }
            ArgLit::Bool(b) => quote! { ::routeforge::MiddlewareArg::Bool(#b) },
        }
    }
}

struct MiddlewareSpec {
    path: Path,
    args: Vec<ArgLit>,
}

impl Parse for MiddlewareSpec {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let path = Path::parse_mod_style(input)?;
        let mut args = Vec::new();
        if input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in input);
            args = Punctuated::<ArgLit, Token![,]>::parse_terminated(&content)?
                .into_iter()
                .collect();
        }
        Ok(MiddlewareSpec { path, args })
    }
}

impl MiddlewareSpec {
    fn tokens(&self) -> TokenStream2 {
        let name = self
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        let args = self.args.iter().map(ArgLit::tokens);
        quote! {
            ::routeforge::MiddlewareDeclaration::new(#name, ::std::vec![#(#args),*])
        }
    }
}

fn is_attr(attr: &Attribute, name: &str) -> bool {
    attr.path().is_ident(name)
}

fn parse_middlewares(attrs: &[Attribute]) -> SynResult<Vec<TokenStream2>> {
    let mut out = Vec::new();
    for attr in attrs.iter().filter(|a| is_attr(a, "middleware")) {
        let specs =
            attr.parse_args_with(Punctuated::<MiddlewareSpec, Token![,]>::parse_terminated)?;
        out.extend(specs.iter().map(MiddlewareSpec::tokens));
    }
    Ok(out)
}

fn parse_routes(attrs: &[Attribute]) -> SynResult<Vec<RouteArgs>> {
    let mut out = Vec::new();
    for attr in attrs.iter().filter(|a| is_attr(a, "route")) {
        let args = match &attr.meta {
            Meta::Path(_) => RouteArgs {
                method: Ident::new("GET", Span::call_site()),
                path: String::new(),
            },
            _ => attr.parse_args::<RouteArgs>()?,
        };
        out.push(args);
    }
    Ok(out)
}

fn method_variant(method: &Ident) -> SynResult<Ident> {
    let upper = method.to_string().to_ascii_uppercase();
    METHODS
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, variant)| Ident::new(variant, method.span()))
        .ok_or_else(|| {
            syn::Error::new(
                method.span(),
                "expected one of GET, POST, PUT, DELETE, HEAD, PATCH, OPTIONS",
            )
        })
}

/// Code generated for one routed method.
struct Handler {
    routes: Vec<TokenStream2>,
    arm: TokenStream2,
}

fn expand_handler(method: &ImplItemFn, routes: Vec<RouteArgs>) -> SynResult<Handler> {
    if !matches!(method.vis, Visibility::Public(_)) {
        return Err(syn::Error::new_spanned(
            &method.sig.ident,
            "routed methods must be `pub`",
        ));
    }

    let ident = &method.sig.ident;
    let name = ident.to_string();
    let mut has_receiver = false;
    let mut params: Vec<(Ident, Type)> = Vec::new();
    for input in &method.sig.inputs {
        match input {
            FnArg::Receiver(receiver) => {
                if receiver.reference.is_none() {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "routed methods take `&self`, `&mut self` or no receiver",
                    ));
                }
                has_receiver = true;
            }
            FnArg::Typed(typed) => match typed.pat.as_ref() {
                Pat::Ident(pat) => params.push((pat.ident.clone(), (*typed.ty).clone())),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "handler parameters must be plain identifiers named after path captures",
                    ))
                }
            },
        }
    }

    let middlewares = parse_middlewares(&method.attrs)?;
    let param_names: Vec<String> = params.iter().map(|(i, _)| i.to_string()).collect();
    let mut route_tokens = Vec::new();
    for route in routes {
        let variant = method_variant(&route.method)?;
        let path = route.path;
        route_tokens.push(quote! {
            ::routeforge::RouteDeclaration {
                method: ::routeforge::HttpMethod::#variant,
                path: ::std::string::String::from(#path),
                handler: ::std::string::String::from(#name),
                params: ::std::vec![#(::std::string::String::from(#param_names)),*],
                middlewares: ::std::vec![#(#middlewares),*],
            }
        });
    }

    let expected = params.len();
    let bindings = params.iter().map(|(param, ty)| {
        let param_name = param.to_string();
        quote! {
            let #param: #ty = ::routeforge::controller::parse_arg(
                #name,
                #param_name,
                ::core::stringify!(#ty),
                __args.next(),
            )?;
        }
    });
    let call_args = params.iter().map(|(param, _)| param);
    let call = if has_receiver {
        quote! { self.#ident(#(#call_args),*) }
    } else {
        quote! { Self::#ident(#(#call_args),*) }
    };
    let arm = quote! {
        #name => {
            if args.len() != #expected {
                return ::core::result::Result::Err(::routeforge::InvokeError::Arity {
                    method: ::std::string::String::from(#name),
                    expected: #expected,
                    actual: args.len(),
                });
            }
            #[allow(unused_mut, unused_variables)]
            let mut __args = args.into_iter();
            #(#bindings)*
            ::routeforge::IntoHandlerResult::into_handler_result(#call, #name)
        }
    };

    Ok(Handler {
        routes: route_tokens,
        arm,
    })
}

fn expand(args: ControllerArgs, mut item: ItemImpl) -> SynResult<TokenStream2> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[controller] does not support generic types",
        ));
    }
    if let Some((_, trait_path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            trait_path,
            "#[controller] goes on an inherent impl block",
        ));
    }

    let self_ty = item.self_ty.clone();
    let type_ident = match self_ty.as_ref() {
        Type::Path(p) => p
            .path
            .segments
            .last()
            .map(|s| s.ident.clone())
            .ok_or_else(|| syn::Error::new_spanned(&self_ty, "expected a type name"))?,
        other => return Err(syn::Error::new_spanned(other, "expected a type name")),
    };
    let type_name = type_ident.to_string();

    let class_middlewares = parse_middlewares(&item.attrs)?;
    item.attrs.retain(|a| !is_attr(a, "middleware"));

    let mut routes = Vec::new();
    let mut arms = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let declared = parse_routes(&method.attrs)?;
        if declared.is_empty() {
            if method.attrs.iter().any(|a| is_attr(a, "middleware")) {
                return Err(syn::Error::new_spanned(
                    &method.sig.ident,
                    "#[middleware] on a method requires #[route]",
                ));
            }
            continue;
        }
        let handler = expand_handler(method, declared)?;
        routes.extend(handler.routes);
        arms.push(handler.arm);
        method
            .attrs
            .retain(|a| !is_attr(a, "route") && !is_attr(a, "middleware"));
    }

    let base = args.base.map(|b| b.value()).unwrap_or_default();
    let context_receiver = args.context.map(|field| {
        quote! {
            fn context_receiver(
                &mut self,
            ) -> ::core::option::Option<&mut dyn ::routeforge::AcceptsContext> {
                ::core::option::Option::Some(&mut self.#field)
            }
        }
    });

    Ok(quote! {
        #item

        impl ::routeforge::Controller for #self_ty {
            fn declaration() -> ::routeforge::ControllerDeclaration {
                ::routeforge::ControllerDeclaration {
                    type_name: ::std::string::String::from(
                        ::core::concat!(::core::module_path!(), "::", #type_name),
                    ),
                    base_path: ::std::string::String::from(#base),
                    middlewares: ::std::vec![#(#class_middlewares),*],
                    routes: ::std::vec![#(#routes),*],
                }
            }

            #[allow(unused_variables)]
            fn invoke(
                &mut self,
                method: &str,
                args: ::std::vec::Vec<::std::string::String>,
            ) -> ::core::result::Result<::routeforge::Response, ::routeforge::InvokeError> {
                match method {
                    #(#arms)*
                    _ => ::core::result::Result::Err(::routeforge::InvokeError::UnknownMethod {
                        method: ::std::string::String::from(method),
                    }),
                }
            }

            #context_receiver
        }

        ::routeforge::inventory::submit! {
            ::routeforge::registry::ControllerEntry {
                type_name: ::core::concat!(::core::module_path!(), "::", #type_name),
                declaration: <#self_ty as ::routeforge::Controller>::declaration,
                create: ::routeforge::registry::instantiate::<#self_ty>,
            }
        }
    })
}

/// Turn an inherent impl block into a registered controller.
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let item = parse_macro_input!(item as ItemImpl);
    expand(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
