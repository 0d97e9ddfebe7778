//! Inbound frame validation rules.

use zingram_core::error::AppError;

/// Validates a raw inbound frame before deserialization.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    Ok(())
}

/// Validates chat message text.
pub fn validate_text(text: &str, max_chars: usize) -> Result<(), AppError> {
    if text.is_empty() {
        return Err(AppError::validation("Message text is empty"));
    }

    if text.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "Message text exceeds {max_chars} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_frame_rejected() {
        assert!(validate_frame(&"x".repeat(100), 10).is_err());
        assert!(validate_frame("{\"type\":\"typing\"}", 100).is_ok());
    }

    #[test]
    fn blank_frame_rejected() {
        assert!(validate_frame("   ", 100).is_err());
    }

    #[test]
    fn empty_text_rejected() {
        assert!(validate_text("", 10).is_err());
        assert!(validate_text("hello", 10).is_ok());
        assert!(validate_text("toolongtext", 5).is_err());
    }
}
