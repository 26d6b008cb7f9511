//! Presentation masking for previews.
//!
//! Masked strings are only ever shown to the user. Payloads sent to the
//! server always carry the original values.

const MASK: char = '*';

fn mask_alphanumeric(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() { MASK } else { c })
        .collect()
}

/// Mask a matched value for display.
///
/// Emails keep the `@` and the dots of the domain; the local part loses its
/// dots too. Every other rule keeps punctuation and separators.
pub fn mask_preview(value: &str, rule: &str) -> String {
    if rule != "email" {
        return mask_alphanumeric(value);
    }

    let mask_local = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_alphanumeric() || c == '.' { MASK } else { c })
            .collect()
    };

    match value.split_once('@') {
        Some((local, domain)) => format!("{}@{}", mask_local(local), mask_alphanumeric(domain)),
        None => mask_local(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_mask() {
        assert_eq!(mask_preview("user@example.com", "email"), "****@*******.***");
        assert_eq!(mask_preview("john.doe@x.co.kr", "email"), "********@*.**.**");
    }

    #[test]
    fn test_phone_mask() {
        assert_eq!(mask_preview("010-1234-5678", "phone_mobile"), "***-****-****");
    }

    #[test]
    fn test_other_rules_keep_punctuation() {
        assert_eq!(mask_preview("900101-1234567", "rrn"), "******-*******");
        assert_eq!(mask_preview("M12_345 67", "passport"), "***_*** **");
        assert_eq!(mask_preview("a.b@c", "custom"), "*.*@*");
    }
}
