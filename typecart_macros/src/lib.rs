use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr, Result as SynResult, Type};

/// Sources accepted inside `#[bind(...)]`, mapped to `typecart::bind::Source` variants.
const SOURCES: &[(&str, &str)] = &[
    ("path", "Path"),
    ("query", "Query"),
    ("form", "Form"),
    ("header", "Header"),
    ("meta", "Meta"),
];

struct TagDef {
    source: Ident,
    key: LitStr,
}

struct FieldDef {
    ident: Ident,
    ty: Type,
    tags: Vec<TagDef>,
}

fn parse_tags(field: &syn::Field) -> SynResult<Vec<TagDef>> {
    let mut tags = Vec::new();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("bind")) {
        attr.parse_nested_meta(|meta| {
            let name = meta
                .path
                .get_ident()
                .map(|i| i.to_string())
                .unwrap_or_default();
            let variant = SOURCES
                .iter()
                .find(|(tag, _)| *tag == name)
                .map(|(_, variant)| *variant)
                .ok_or_else(|| {
                    meta.error("unknown bind source, expected one of path, query, form, header, meta")
                })?;
            let key: LitStr = meta.value()?.parse()?;
            if tags
                .iter()
                .any(|t: &TagDef| t.source == variant)
            {
                return Err(meta.error(format!("duplicate `{name}` tag on the same field")));
            }
            tags.push(TagDef {
                source: format_ident!("{}", variant),
                key,
            });
            Ok(())
        })?;
    }
    Ok(tags)
}

fn collect_fields(input: &DeriveInput) -> SynResult<Vec<FieldDef>> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Bind)] does not support generic types",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "#[derive(Bind)] requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Bind)] can only be used on structs",
            ))
        }
    };

    let mut out = Vec::new();
    for field in fields {
        let tags = parse_tags(field)?;
        if tags.is_empty() {
            continue;
        }
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        out.push(FieldDef {
            ident,
            ty: field.ty.clone(),
            tags,
        });
    }
    Ok(out)
}

/// Derives `typecart::bind::Bindable`.
///
/// Every field carrying `#[bind(source = "key")]` becomes an entry of the
/// binding table together with addressable getters for the binder. Fields
/// without the attribute are left to the body converter.
///
/// ```ignore
/// #[derive(Default, Deserialize, JsonSchema, Bind)]
/// struct GetItem {
///     #[bind(path = "id")]
///     id: String,
///     #[bind(query = "fields", header = "X-Fields")]
///     fields: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let fields = match collect_fields(&input) {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error().into(),
    };
    let name = &input.ident;

    let bindings = fields.iter().flat_map(|f| {
        let field_name = f.ident.to_string();
        let ty = &f.ty;
        f.tags.iter().map(move |tag| {
            let source = &tag.source;
            let key = &tag.key;
            quote! {
                ::typecart::bind::Binding {
                    field: #field_name,
                    source: ::typecart::bind::Source::#source,
                    key: #key,
                    schema: ::typecart::bind::field_schema::<#ty>,
                },
            }
        })
    });

    let getters = fields.iter().map(|f| {
        let ident = &f.ident;
        let field_name = ident.to_string();
        quote! { #field_name => Some(&self.#ident), }
    });
    let setters = fields.iter().map(|f| {
        let ident = &f.ident;
        let field_name = ident.to_string();
        quote! { #field_name => Some(&mut self.#ident), }
    });

    let expanded = quote! {
        impl ::typecart::bind::Bindable for #name {
            const AGGREGATE: bool = true;

            fn bindings() -> &'static [::typecart::bind::Binding] {
                static BINDINGS: &[::typecart::bind::Binding] = &[ #(#bindings)* ];
                BINDINGS
            }

            #[allow(unused_variables)]
            fn field(&self, name: &str) -> ::std::option::Option<&dyn ::typecart::bind::FieldValue> {
                match name {
                    #(#getters)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn field_mut(&mut self, name: &str) -> ::std::option::Option<&mut dyn ::typecart::bind::FieldValue> {
                match name {
                    #(#setters)*
                    _ => None,
                }
            }
        }
    };
    TokenStream::from(expanded)
}
