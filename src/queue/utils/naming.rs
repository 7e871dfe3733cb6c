use crate::queue::error::{Error, Result};

/// Longest identifier PostgreSQL keeps without truncation (NAMEDATALEN - 1)
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Check that a queue name is usable as a notification channel.
///
/// Queue names are sent verbatim to `pg_notify` and quoted for `LISTEN`, so the
/// only constraints are the ones PostgreSQL places on identifiers.
///
/// # Examples
///
/// ```
/// use p2k16::queue::utils::naming::validate_queue_name;
///
/// assert!(validate_queue_name("ldap-sync").is_ok());
/// assert!(validate_queue_name("").is_err());
/// assert!(validate_queue_name(&"q".repeat(64)).is_err());
/// ```
pub fn validate_queue_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::ValidationError("queue name is empty".to_string()));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::ValidationError(format!(
            "queue name '{}' is longer than {} bytes",
            name, MAX_IDENTIFIER_LEN
        )));
    }
    if name.contains('\0') {
        return Err(Error::ValidationError(
            "queue name contains a NUL character".to_string(),
        ));
    }
    Ok(())
}

/// Quote an identifier for inclusion in SQL text.
///
/// # Examples
///
/// ```
/// use p2k16::queue::utils::naming::quote_identifier;
///
/// assert_eq!(quote_identifier("ldap-sync"), "\"ldap-sync\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Interpret a notification payload as a message id.
///
/// Returns None for anything that is not a decimal integer.
pub fn parse_payload(payload: &str) -> Option<i64> {
    payload.trim().parse::<i64>().ok()
}
