//! Pre-flight checks for pmuprof
//!
//! Validates the inputs before any external tool is run, so a typo in a
//! path fails with a clear message instead of a collaborator error.

use anyhow::{bail, Context, Result};
use object::{Object, ObjectSection};
use std::path::Path;

/// Run all pre-flight checks on the profile and both binaries
///
/// `quiet` skips the symbol table inspection and its stripped-binary warning.
///
/// # Errors
/// Returns an error if any input is missing or not a regular file
pub fn run_preflight_checks(profile: &Path, kernel: &Path, user: &Path, quiet: bool) -> Result<()> {
    check_input_exists(profile, "Profile")?;
    for binary in [kernel, user] {
        check_input_exists(binary, "Binary")?;
        if !quiet {
            check_symbol_table(binary)?;
        }
    }
    Ok(())
}

/// Check that an input path exists and is a regular file
fn check_input_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!(
            "{what} not found: {}\n\n\
             Make sure the path is correct and the file exists.",
            path.display()
        );
    }
    if !path.is_file() {
        bail!(
            "Not a file: {}\n\n\
             Inputs must be regular files, not directories.",
            path.display()
        );
    }
    Ok(())
}

/// Warn when a binary has no symbol table; its dump would be empty
fn check_symbol_table(binary: &Path) -> Result<()> {
    let file_data = std::fs::read(binary)
        .with_context(|| format!("Failed to read binary: {}", binary.display()))?;

    let Ok(obj) = object::File::parse(&*file_data) else {
        // Not an object file we understand, let the symbol dump decide
        return Ok(());
    };

    let has_symtab = obj.section_by_name(".symtab").is_some_and(|s| s.size() > 0);
    if !has_symtab {
        eprintln!(
            "warning: {} is stripped, its samples cannot be attributed",
            binary.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found() {
        let result = check_input_exists(Path::new("/nonexistent/path/to/binary"), "Binary");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Binary not found"));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_input_exists(dir.path(), "Profile").unwrap_err().to_string();
        assert!(err.contains("Not a file"));
    }

    #[test]
    fn test_non_object_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-elf");
        std::fs::write(&path, "ff00 0 1\n").unwrap();

        assert!(check_symbol_table(&path).is_ok());
        assert!(run_preflight_checks(&path, &path, &path, false).is_ok());
    }
}
