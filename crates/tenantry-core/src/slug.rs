//! Slug and tenant collection name derivation.

/// Prefix shared by every tenant collection.
pub const COLLECTION_PREFIX: &str = "org_";

/// Normalize a name into an identifier-safe slug.
///
/// ASCII alphanumerics are lower-cased, every other character becomes
/// `_`, and leading/trailing underscores are stripped.
pub fn slugify(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    mapped.trim_matches('_').to_string()
}

/// Tenant collection name for an organization name, or `None` if the
/// name has no alphanumeric content to build a slug from.
pub fn collection_name(name: &str) -> Option<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        None
    } else {
        Some(format!("{COLLECTION_PREFIX}{slug}"))
    }
}

/// Whether a string is safe to use verbatim as a collection identifier.
pub fn is_valid_collection_name(name: &str) -> bool {
    name.starts_with(COLLECTION_PREFIX)
        && name.len() > COLLECTION_PREFIX.len()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
