use super::AuthError;

/// Pull the token out of an `Authorization: Bearer <token>` value.
///
/// The value must be exactly two whitespace-separated parts, the first being
/// the literal `Bearer`.
pub fn extract_from_header(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .filter(|h| !h.trim().is_empty())
        .ok_or(AuthError::MissingHeader)?;

    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}
