//! Parameter list normalization: comma splitting, default stripping, vector
//! expansion and decoration folding.

use shimgen_ffi::types::{VECTOR_LANES, tidy_type};
use shimgen_ffi::{Decoration, NormalizedParameter, RawParameter, VectorConfig};

/// Normalizes the text between a declaration's outer parentheses.
pub fn normalize_parameters(raw: &str, vectors: &VectorConfig) -> Vec<NormalizedParameter> {
    let mut params = Vec::new();

    for (position, segment) in raw
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
    {
        let segment = strip_default(segment);
        if segment.is_empty() || segment == "void" {
            continue;
        }

        if let Some(arity) = vectors.arity_of(segment) {
            params.extend(expand_vector(arity));
            continue;
        }

        params.push(parse_parameter(segment, position).normalize());
    }

    params
}

/// Scalar lanes standing in for one vector parameter, in x, y, z order.
pub fn expand_vector(arity: usize) -> impl Iterator<Item = NormalizedParameter> {
    VECTOR_LANES
        .iter()
        .take(arity)
        .map(|lane| NormalizedParameter::new("float", *lane))
}

/// Splits `type name` at the last whitespace. Leading `*`/`&` on the name
/// become the decoration; a nameless parameter is called `arg<position>`.
pub fn parse_parameter(segment: &str, position: usize) -> RawParameter {
    let (ty, name) = match segment.rfind(char::is_whitespace) {
        Some(idx) => (segment[..idx].trim(), segment[idx..].trim()),
        None => (segment, ""),
    };

    if is_type_only(ty, name) {
        return RawParameter {
            declared_type: tidy_type(segment),
            name: format!("arg{position}"),
            decoration: Decoration::None,
        };
    }

    // `const char *name` and `Foo &name`: marks stuck to the name.
    let marks = name.len() - name.trim_start_matches(['*', '&']).len();
    let mut declared_type = tidy_type(ty);
    let mut name = name;
    if marks > 1 {
        declared_type.push_str(&name[..marks - 1]);
        name = &name[marks - 1..];
    }
    let decoration = match name.chars().next() {
        Some('*') => Decoration::Pointer,
        Some('&') => Decoration::Reference,
        _ => Decoration::None,
    };

    RawParameter {
        declared_type,
        name: name.trim_start_matches(['*', '&']).to_string(),
        decoration,
    }
}

/// True when the trailing word still belongs to the type: `int`,
/// `const std::string&`, `const Foo`, `char *`.
fn is_type_only(leading: &str, trailing: &str) -> bool {
    let word = trailing.trim_start_matches(['*', '&']);
    word.is_empty()
        || word.contains(['*', '&', ':', '<', '>'])
        || is_type_suffix(word)
        || leading.split_whitespace().all(is_qualifier)
}

/// `unsigned int`, `long long`: the last word is still part of the type.
fn is_type_suffix(word: &str) -> bool {
    matches!(
        word,
        "int" | "char" | "short" | "long" | "float" | "double" | "bool"
    )
}

/// Words that cannot stand alone as a parameter type.
fn is_qualifier(word: &str) -> bool {
    matches!(word, "const" | "volatile" | "struct" | "class" | "enum")
}

fn strip_default(segment: &str) -> &str {
    segment
        .find('=')
        .map_or(segment, |idx| segment[..idx].trim_end())
}
