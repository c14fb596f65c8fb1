use super::error::{RepositoryError, Result};

/// Whether `id` can name a group or config. Both backends apply the same
/// rule: ids become file names in the local backend, so anything that is
/// empty, a dot entry, or contains a separator or NUL is refused.
pub(super) fn is_valid(id: &str) -> bool {
    !(id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '\0']))
}

pub(super) fn validate(id: &str) -> Result<()> {
    if is_valid(id) {
        Ok(())
    } else {
        Err(RepositoryError::InvalidId(id.to_string()))
    }
}
