//! Input normalization shared by the HTTP handlers and the services.

use crate::error::ValidationError;

/// Maximum length of a chat message, counted in characters.
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// Trim message content and enforce the length limit.
pub fn validate_message_content(content: &str) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing("content"));
    }
    if trimmed.chars().count() > MESSAGE_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "content".to_string(),
            max: MESSAGE_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Agent names are compared after trimming surrounding whitespace.
pub fn normalize_agent_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing("name"));
    }
    Ok(trimmed.to_string())
}

/// Tickers are looked up upper-case.
pub fn normalize_ticker(symbol: &str) -> Result<String, ValidationError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing("symbol"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(ValidationError::invalid(
            "symbol",
            format!("Invalid ticker '{}'", trimmed),
        ));
    }
    Ok(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_message_content_trimmed() {
        assert_eq!(
            validate_message_content("  closing now  "),
            Ok("closing now".to_string())
        );
    }

    #[test]
    fn test_message_content_blank_rejected() {
        assert_eq!(
            validate_message_content("   \n\t"),
            Err(ValidationError::missing("content"))
        );
        assert!(validate_message_content("").is_err());
    }

    #[test]
    fn test_message_content_limit_is_inclusive() {
        let exact = "a".repeat(MESSAGE_MAX_CHARS);
        assert!(validate_message_content(&exact).is_ok());

        let over = "a".repeat(MESSAGE_MAX_CHARS + 1);
        assert!(matches!(
            validate_message_content(&over),
            Err(ValidationError::TooLong { max: 1000, .. })
        ));
    }

    #[test]
    fn test_message_limit_counts_chars_not_bytes() {
        let accented = "é".repeat(MESSAGE_MAX_CHARS);
        assert!(accented.len() > MESSAGE_MAX_CHARS);
        assert!(validate_message_content(&accented).is_ok());
    }

    #[test]
    fn test_agent_name_normalized() {
        assert_eq!(normalize_agent_name("  Neon "), Ok("Neon".to_string()));
        assert!(normalize_agent_name(" ").is_err());
    }

    #[test]
    fn test_ticker_upper_cased() {
        assert_eq!(normalize_ticker("qtzm"), Ok("QTZM".to_string()));
        assert_eq!(normalize_ticker(" brk.b "), Ok("BRK.B".to_string()));
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("QT ZM").is_err());
        assert!(normalize_ticker("../etc").is_err());
    }

    proptest! {
        #[test]
        fn prop_accepted_content_is_trimmed_and_bounded(s in "\\PC{0,1200}") {
            if let Ok(content) = validate_message_content(&s) {
                prop_assert_eq!(content.trim(), content.as_str());
                prop_assert!(!content.is_empty());
                prop_assert!(content.chars().count() <= MESSAGE_MAX_CHARS);
            }
        }
    }
}
