//! Display labels for upstream enum codes.

/// Document or collection status.
#[must_use]
pub fn document_status(code: i64) -> String {
    match code {
        0 => "Draft".to_string(),
        1 => "Pending".to_string(),
        2 => "Completed".to_string(),
        3 => "Cancelled".to_string(),
        4 => "Expired".to_string(),
        n => format!("Unknown ({n})"),
    }
}

/// Signer progress.
#[must_use]
pub fn signer_status(code: i64) -> String {
    match code {
        0 => "Pending".to_string(),
        1 => "In Progress".to_string(),
        2 => "Completed".to_string(),
        3 => "Declined".to_string(),
        n => format!("Unknown ({n})"),
    }
}

/// Template availability.
#[must_use]
pub fn template_status(code: i64) -> String {
    match code {
        1 => "Active".to_string(),
        2 => "Inactive".to_string(),
        3 => "One Time Use".to_string(),
        n => format!("Unknown ({n})"),
    }
}

/// Account role.
#[must_use]
pub fn user_type(code: i64) -> String {
    match code {
        1 => "Basic".to_string(),
        2 => "Editor".to_string(),
        3 => "Company Admin".to_string(),
        n => format!("Unknown ({n})"),
    }
}

/// Account state.
#[must_use]
pub fn user_status(code: i64) -> String {
    match code {
        0 => "Created".to_string(),
        1 => "Active".to_string(),
        2 => "Inactive".to_string(),
        3 => "Blocked".to_string(),
        n => format!("Unknown ({n})"),
    }
}

/// Delivery channel for signing links.
#[must_use]
pub fn sending_method(code: i64) -> String {
    match code {
        1 => "SMS".to_string(),
        2 => "Email".to_string(),
        3 => "WhatsApp".to_string(),
        n => format!("Unknown ({n})"),
    }
}

/// UI language; anything but English is Hebrew.
#[must_use]
pub const fn language(code: i64) -> &'static str {
    if code == 1 {
        "English"
    } else {
        "Hebrew"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(document_status(2), "Completed");
        assert_eq!(document_status(9), "Unknown (9)");
        assert_eq!(signer_status(1), "In Progress");
        assert_eq!(template_status(3), "One Time Use");
        assert_eq!(user_type(3), "Company Admin");
        assert_eq!(user_status(3), "Blocked");
        assert_eq!(sending_method(1), "SMS");
        assert_eq!(sending_method(3), "WhatsApp");
        assert_eq!(language(1), "English");
        assert_eq!(language(2), "Hebrew");
    }
}
