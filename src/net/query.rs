//! Text of the variable-mapping queries and predicates understood by the
//! workflow engine. These strings are an external wire format: the serializer
//! only escapes them for XML, it never rewrites them.

/// Path to the text value of `name` in `scope`: `/scope/name/text()`.
pub fn text_path(scope: &str, name: &str) -> String {
    format!("/{}/{}/text()", scope, name)
}

/// Path to the element `name` in `scope`: `/scope/name`.
pub fn element_path(scope: &str, name: &str) -> String {
    format!("/{}/{}", scope, name)
}

/// Wraps an expression into the element `tag`: `<tag>{expr}</tag>`.
pub fn wrap(tag: &str, expression: &str) -> String {
    format!("<{}>{{{}}}</{}>", tag, expression, tag)
}

/// Copies `name` out of `scope` into an element of the same name.
pub fn read_variable(scope: &str, name: &str) -> String {
    wrap(name, &text_path(scope, name))
}

/// Writes a literal value into the element `tag`: `<tag>value</tag>`.
pub fn literal(tag: &str, value: &str) -> String {
    format!("<{}>{}</{}>", tag, value, tag)
}

/// Boolean raised in the enclosing net when `host` ends on its error path:
/// `<host>_exception`. The name carries the host id only, so every error
/// event attached to one host shares the flag.
pub fn error_flag_name(host: &str) -> String {
    format!("{}_exception", host)
}

/// Output parameter the error path sets inside the host's own net:
/// `_<host>_exception`.
pub fn inner_error_flag_name(host: &str) -> String {
    format!("_{}_exception", host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_variable_matches_engine_syntax() {
        assert_eq!(read_variable("Net", "amount"), "<amount>{/Net/amount/text()}</amount>");
    }

    #[test]
    fn literal_has_no_braces() {
        assert_eq!(literal("_t_exception", "true"), "<_t_exception>true</_t_exception>");
    }

    #[test]
    fn paths() {
        assert_eq!(text_path("a", "b"), "/a/b/text()");
        assert_eq!(element_path("a", "b"), "/a/b");
    }

    #[test]
    fn error_flags_are_keyed_by_host() {
        assert_eq!(error_flag_name("Node_Sub_3"), "Node_Sub_3_exception");
        assert_eq!(inner_error_flag_name("Node_Sub_3"), "_Node_Sub_3_exception");
        assert_eq!(
            wrap(&error_flag_name("Node_Sub_3"), &text_path("Node_Sub_3", &inner_error_flag_name("Node_Sub_3"))),
            "<Node_Sub_3_exception>{/Node_Sub_3/_Node_Sub_3_exception/text()}</Node_Sub_3_exception>"
        );
    }
}
