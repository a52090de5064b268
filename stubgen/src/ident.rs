//! Utility functions for working with identifiers.

use heck::ToSnakeCase;

/// Converts a `camelCase` or `UpperCamel` identifier to a `lower_snake` case identifier.
pub fn to_snake(s: &str) -> String {
    s.to_snake_case()
}

/// Returns the accessor name protobuf's C++ code generator emits for a field.
///
/// Field names are lower-cased, and names colliding with a C++ keyword get a trailing `_`.
pub fn cpp_field_name(s: &str) -> String {
    let ident = s.to_lowercase();

    match &ident[..] {
        "alignas" | "alignof" | "and" | "and_eq" | "asm" | "auto" | "bitand" | "bitor"
        | "bool" | "break" | "case" | "catch" | "char" | "class" | "compl" | "const"
        | "constexpr" | "const_cast" | "continue" | "decltype" | "default" | "delete" | "do"
        | "double" | "dynamic_cast" | "else" | "enum" | "explicit" | "export" | "extern"
        | "false" | "float" | "for" | "friend" | "goto" | "if" | "inline" | "int" | "long"
        | "mutable" | "namespace" | "new" | "noexcept" | "not" | "not_eq" | "nullptr"
        | "operator" | "or" | "or_eq" | "private" | "protected" | "public" | "register"
        | "reinterpret_cast" | "return" | "short" | "signed" | "sizeof" | "static"
        | "static_assert" | "static_cast" | "struct" | "switch" | "template" | "this"
        | "thread_local" | "throw" | "true" | "try" | "typedef" | "typeid" | "typename"
        | "union" | "unsigned" | "using" | "virtual" | "void" | "volatile" | "wchar_t"
        | "while" | "xor" | "xor_eq" => format!("{}_", ident),
        _ => ident,
    }
}

/// Escapes `s` for use inside a C++ string literal.
pub fn cpp_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake() {
        assert_eq!("foo_bar", &to_snake("FooBar"));
        assert_eq!("greeter", &to_snake("Greeter"));
        assert_eq!("xml_http_request", &to_snake("XMLHttpRequest"));
        assert_eq!("route_guide", &to_snake("RouteGuide"));
        assert_eq!("fuzz_buster", &to_snake("FUZZ_BUSTER"));
    }

    #[test]
    fn test_cpp_field_name() {
        assert_eq!("message", &cpp_field_name("message"));
        assert_eq!("user_id", &cpp_field_name("user_id"));
        assert_eq!("userid", &cpp_field_name("userId"));
        assert_eq!("class_", &cpp_field_name("class"));
        assert_eq!("new_", &cpp_field_name("New"));
    }

    #[test]
    fn test_cpp_string_literal() {
        assert_eq!(r#""plain""#, cpp_string_literal("plain"));
        assert_eq!(r#""a\"b\\c\n""#, cpp_string_literal("a\"b\\c\n"));
    }
}
