//! External key names for record fields.
//!
//! A field is looked up under the snake_case form of its identifier unless its
//! tag renames it. Tags are comma separated: the token `optional` marks the
//! field as optional, any other token is the new name.

const OPTIONAL_MARKER: &str = "optional";

/// The key and optionality resolved for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub external_name: String,
    pub optional: bool,
}

/// Converts an identifier like `MaxConns` into `max_conns`.
///
/// Characters other than uppercase letters pass through unchanged, so an
/// identifier that is already snake_case maps to itself.
pub fn to_snake_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for (i, c) in identifier.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolves the external name and optional flag of a field from its tag.
///
/// An empty tag is the same as no tag. Tokens are used verbatim, so the empty
/// token in `",optional"` renames the field to `""`.
pub fn resolve_tag(identifier: &str, tag: Option<&str>) -> ResolvedName {
    let mut resolved = ResolvedName {
        external_name: to_snake_case(identifier),
        optional: false,
    };

    let Some(tag) = tag.filter(|t| !t.is_empty()) else {
        return resolved;
    };

    for token in tag.split(',') {
        match token {
            OPTIONAL_MARKER => resolved.optional = true,
            name => resolved.external_name = name.to_string(),
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("Cool"), "cool");
        assert_eq!(to_snake_case("MaxConns"), "max_conns");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("HTTPPort"), "h_t_t_p_port");
        assert_eq!(to_snake_case("port2Go"), "port2_go");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_no_tag_uses_snake_case() {
        let resolved = resolve_tag("ListenAddr", None);
        assert_eq!(resolved.external_name, "listen_addr");
        assert!(!resolved.optional);
    }

    #[test]
    fn test_rename() {
        let resolved = resolve_tag("Cool", Some("coolio"));
        assert_eq!(resolved.external_name, "coolio");
        assert!(!resolved.optional);
    }

    #[test]
    fn test_optional_in_any_position() {
        for tag in ["coolio,optional", "optional,coolio"] {
            let resolved = resolve_tag("Cool", Some(tag));
            assert_eq!(resolved.external_name, "coolio");
            assert!(resolved.optional);
        }

        let resolved = resolve_tag("Cool", Some("optional"));
        assert_eq!(resolved.external_name, "cool");
        assert!(resolved.optional);
    }

    #[test]
    fn test_last_rename_wins() {
        let resolved = resolve_tag("Cool", Some("first,second"));
        assert_eq!(resolved.external_name, "second");
    }

    #[test]
    fn test_empty_tag_is_no_tag() {
        assert_eq!(resolve_tag("Cool", Some("")), resolve_tag("Cool", None));
    }

    #[test]
    fn test_empty_token_is_verbatim_rename() {
        let resolved = resolve_tag("Cool", Some(",optional"));
        assert_eq!(resolved.external_name, "");
        assert!(resolved.optional);
    }
}
