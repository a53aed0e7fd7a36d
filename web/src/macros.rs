//! Shared macros for the web crate.

/// Generate a `fmt::Debug` implementation that redacts sensitive fields.
///
/// Three field kinds are supported, specified as a keyword before the field name:
///
/// - `show field_name` - prints the field value normally
/// - `redact field_name` - prints `"[REDACTED]"` instead of the value
/// - `redact_option field_name` - prints `Some("[REDACTED]")` or `None`
///
/// # Example
///
/// ```ignore
/// redacted_debug!(LoginForm {
///     show email,
///     redact password,
/// });
/// ```
macro_rules! redacted_debug {
    ($name:ident { $( $kind:ident $field:ident ),* $(,)? }) => {
        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut s = f.debug_struct(stringify!($name));
                $( redacted_debug!(@add_field s, self, $kind, $field); )*
                s.finish_non_exhaustive()
            }
        }
    };
    (@add_field $s:ident, $self:ident, show, $field:ident) => {
        $s.field(stringify!($field), &$self.$field);
    };
    (@add_field $s:ident, $self:ident, redact, $field:ident) => {
        $s.field(stringify!($field), &"[REDACTED]");
    };
    (@add_field $s:ident, $self:ident, redact_option, $field:ident) => {
        $s.field(stringify!($field), &$self.$field.as_ref().map(|_| "[REDACTED]"));
    };
}

#[cfg(test)]
mod tests {
    #[allow(dead_code)]
    struct Credentials {
        pub email: String,
        pub password: String,
        pub google_token: Option<String>,
    }

    redacted_debug!(Credentials {
        show email,
        redact password,
        redact_option google_token,
    });

    #[test]
    fn test_redacted_debug_hides_secret_fields() {
        let c = Credentials {
            email: "jane@example.com".to_string(),
            password: "hunter22".to_string(),
            google_token: Some("ya29.token".to_string()),
        };
        let output = format!("{:?}", c);
        assert!(output.contains("jane@example.com"));
        assert!(!output.contains("hunter22"));
        assert!(!output.contains("ya29.token"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_redacted_debug_option_none() {
        let c = Credentials {
            email: "a@b.c".to_string(),
            password: "x".to_string(),
            google_token: None,
        };
        let output = format!("{:?}", c);
        assert!(output.contains("None"));
    }
}
