//! # Tool Path Resolver
//!
//! Locates the `vtfcmd` executable. The resolved path is handed to
//! [`crate::vtfcmd::VtfCmd`] and carried explicitly from there; the process
//! working directory is never changed.
//!
//! Lookup order:
//! 1. Explicit path (CLI `--vtfcmd` or config file)
//! 2. `VTFCMD_PATH` environment variable
//! 3. Next to the running binary: `<bin dir>/vtfcmd/vtfcmd[.exe]`, `<bin dir>/vtfcmd[.exe]`
//! 4. System `PATH`

use crate::error::OptimizeError;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TOOL_NAME: &str = "vtfcmd";
pub const TOOL_ENV_VAR: &str = "VTFCMD_PATH";

/// Tool path resolver for vtfcmd
pub struct ToolPathResolver {
    /// Directory containing the running binary
    exe_dir: Option<PathBuf>,
    /// Value of `PATH` to search
    search_path: Option<std::ffi::OsString>,
    /// Value of `VTFCMD_PATH`
    env_override: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver from the current process environment
    pub fn new() -> Self {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        debug!("Executable directory: {:?}", exe_dir);

        Self {
            exe_dir,
            search_path: env::var_os("PATH"),
            env_override: env::var_os(TOOL_ENV_VAR).map(PathBuf::from),
        }
    }

    /// Create a resolver with an explicit environment (no process state)
    pub fn with_environment(
        exe_dir: Option<PathBuf>,
        search_path: Option<std::ffi::OsString>,
        env_override: Option<PathBuf>,
    ) -> Self {
        Self { exe_dir, search_path, env_override }
    }

    /// Platform file name of the executable
    pub fn executable_name() -> String {
        format!("{}{}", TOOL_NAME, env::consts::EXE_SUFFIX)
    }

    /// Resolve vtfcmd, preferring `explicit` when given
    pub fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf, OptimizeError> {
        if let Some(path) = explicit {
            debug!("Checking explicit vtfcmd path: {:?}", path);
            return if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(OptimizeError::MissingDependency(format!(
                    "{} not found at {}",
                    TOOL_NAME,
                    path.display()
                )))
            };
        }

        if let Some(ref path) = self.env_override {
            debug!("Checking {}: {:?}", TOOL_ENV_VAR, path);
            if path.is_file() {
                return Ok(path.clone());
            }
            warn!("{} points to a missing file: {}", TOOL_ENV_VAR, path.display());
        }

        if let Some(path) = self.find_bundled() {
            debug!("Using bundled vtfcmd: {:?}", path);
            return Ok(path);
        }

        if let Some(path) = self.find_in_system_path() {
            debug!("Using vtfcmd from PATH: {:?}", path);
            return Ok(path);
        }

        Err(OptimizeError::MissingDependency(format!(
            "{} not found. Pass --vtfcmd, set {}, place it next to the binary \
             (vtfcmd/{}), or add it to PATH",
            TOOL_NAME,
            TOOL_ENV_VAR,
            Self::executable_name()
        )))
    }

    /// Look next to the running binary
    fn find_bundled(&self) -> Option<PathBuf> {
        let exe_dir = self.exe_dir.as_ref()?;
        let name = Self::executable_name();
        let candidates = [exe_dir.join(TOOL_NAME).join(&name), exe_dir.join(&name)];

        candidates.into_iter().find(|path| {
            debug!("Checking bundled path: {:?}", path);
            path.is_file()
        })
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self) -> Option<PathBuf> {
        let name = Self::executable_name();
        env::split_paths(self.search_path.as_ref()?)
            .map(|dir| dir.join(&name))
            .find(|path| path.is_file())
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_explicit_path_wins() {
        let temp_dir = TempDir::new().unwrap();
        let tool = temp_dir.path().join("custom-vtfcmd");
        touch(&tool);

        let resolver = ToolPathResolver::with_environment(None, None, None);
        assert_eq!(resolver.resolve(Some(&tool)).unwrap(), tool);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let resolver = ToolPathResolver::with_environment(None, None, None);
        let err = resolver.resolve(Some(Path::new("/no/such/vtfcmd"))).unwrap_err();
        assert_eq!(err.kind(), "missing-dependency");
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let tool = temp_dir.path().join("tools").join("vtf");
        touch(&tool);

        let resolver = ToolPathResolver::with_environment(None, None, Some(tool.clone()));
        assert_eq!(resolver.resolve(None).unwrap(), tool);
    }

    #[test]
    fn test_bundled_next_to_binary() {
        let temp_dir = TempDir::new().unwrap();
        let tool = temp_dir.path().join("vtfcmd").join(ToolPathResolver::executable_name());
        touch(&tool);

        let resolver = ToolPathResolver::with_environment(Some(temp_dir.path().to_path_buf()), None, None);
        assert_eq!(resolver.resolve(None).unwrap(), tool);
    }

    #[test]
    fn test_system_path_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("bin");
        let tool = bin.join(ToolPathResolver::executable_name());
        touch(&tool);

        let search_path = env::join_paths([temp_dir.path().join("empty"), bin]).unwrap();
        let resolver = ToolPathResolver::with_environment(None, Some(search_path), None);
        assert_eq!(resolver.resolve(None).unwrap(), tool);
    }

    #[test]
    fn test_nothing_found() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = ToolPathResolver::with_environment(
            Some(temp_dir.path().to_path_buf()),
            Some(temp_dir.path().as_os_str().to_owned()),
            None,
        );
        let err = resolver.resolve(None).unwrap_err();
        assert!(err.to_string().contains(TOOL_ENV_VAR));
    }
}
