// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Temporary directory management for integration tests.
//!
//! This module provides utilities for creating and managing temporary
//! directories with automatic cleanup on drop.

use std::path::PathBuf;

/// Temporary directories used for testing.
///
/// Automatically cleans up all created directories when dropped.
#[derive(Debug)]
pub struct TempDirs {
    base: PathBuf,
    /// State directory for database files. Not created up front.
    pub state_dir: PathBuf,
}

impl TempDirs {
    /// Creates a new temporary base directory for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let base = tempfile::tempdir()?.keep();
        let state_dir = base.join("state");
        Ok(Self { base, state_dir })
    }
}

/// Sets up temporary directories for integration tests.
///
/// This is a convenience wrapper around [`TempDirs::new`].
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn setup_temp_dirs() -> Result<TempDirs, Box<dyn std::error::Error>> {
    TempDirs::new()
}

// Implement Drop for automatic cleanup
impl Drop for TempDirs {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.base) {
            eprintln!("failed to clean up temp directory {}: {e}", self.base.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dirs_cleanup_on_drop() {
        let base = {
            let dirs = TempDirs::new().unwrap();
            assert!(dirs.base.exists());
            assert!(!dirs.state_dir.exists());
            dirs.base.clone()
        };
        assert!(!base.exists());
    }
}
