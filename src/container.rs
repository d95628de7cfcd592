//! `MML@...;` envelope handling

use crate::error::{Error, Result};

pub const START_MARKER: &str = "mml@";
pub const END_MARKER: &str = ";";

/// Split a container into lowercase channel strings
pub fn extract_channels(mml: &str) -> Result<Vec<String>> {
    let mml = mml.trim().to_lowercase();
    let body = mml
        .strip_prefix(START_MARKER)
        .ok_or(Error::MissingMarker("MML@"))?;
    let body = body
        .strip_suffix(END_MARKER)
        .ok_or(Error::MissingMarker(END_MARKER))?;
    Ok(body.split(',').map(str::to_string).collect())
}

/// Join channels into a container
pub fn wrap_channels<S: AsRef<str>>(channels: &[S]) -> String {
    let body: Vec<&str> = channels.iter().map(AsRef::as_ref).collect();
    format!("MML@{};", body.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_channels() {
        let channels = extract_channels("MML@T120CDE,l8Ab,;").unwrap();
        assert_eq!(channels, vec!["t120cde", "l8ab", ""]);
    }

    #[test]
    fn test_extract_trims_whitespace() {
        assert_eq!(extract_channels("  mMl@c;\n").unwrap(), vec!["c"]);
    }

    #[test]
    fn test_missing_markers() {
        assert!(matches!(
            extract_channels("cde;"),
            Err(Error::MissingMarker("MML@"))
        ));
        assert!(matches!(
            extract_channels("MML@cde"),
            Err(Error::MissingMarker(";"))
        ));
    }

    #[test]
    fn test_wrap_channels() {
        assert_eq!(wrap_channels(&["t120c", "d"]), "MML@t120c,d;");
        assert_eq!(wrap_channels::<String>(&[]), "MML@;");
    }
}
