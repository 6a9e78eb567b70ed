//! Parse a published checksum manifest.

/// First whitespace-delimited token of a `<hash>  <filename>` manifest.
///
/// Returns `None` for a blank body. The token is returned verbatim: no case
/// folding, no hex validation.
pub(crate) fn parse_manifest(body: &str) -> Option<&str> {
    body.split_whitespace().next()
}
