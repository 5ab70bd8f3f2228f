//! Parameter file loading
//!
//! Parameter files are TOML documents stored under `$ROVER_SW_ROOT/params`. Any struct which
//! implements `serde::Deserialize` can be loaded from one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the parameter directory within the software root.
pub const PARAMS_DIR: &str = "params";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (ROVER_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot read the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot parse the parameter file {0:?}: {1}")]
    DeserialiseError(PathBuf, toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file.
///
/// The file path is relative to the `$ROVER_SW_ROOT/params` directory.
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    let path = crate::host::get_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?
        .join(PARAMS_DIR)
        .join(param_file_path);

    load_path(path)
}

/// Load a parameter file from an explicit path, bypassing the software root.
pub fn load_path<P, Q>(path: Q) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    Q: AsRef<Path>,
{
    let path = path.as_ref();

    let params_str =
        read_to_string(path).map_err(|e| LoadError::FileLoadError(path.to_path_buf(), e))?;

    toml::from_str(&params_str).map_err(|e| LoadError::DeserialiseError(path.to_path_buf(), e))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Gains {
        k_p: f64,
        k_i: f64,
    }

    #[test]
    fn test_load_path() {
        let path = std::env::temp_dir().join("util_params_test_load_path.toml");
        fs::write(&path, "k_p = 1.5\nk_i = 0.25\n").unwrap();

        let gains: Gains = load_path(&path).unwrap();
        assert_eq!(gains, Gains { k_p: 1.5, k_i: 0.25 });

        fs::write(&path, "k_p = \"fast\"\n").unwrap();
        assert!(matches!(
            load_path::<Gains, _>(&path),
            Err(LoadError::DeserialiseError(..))
        ));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("util_params_test_does_not_exist.toml");

        match load_path::<Gains, _>(&path) {
            Err(LoadError::FileLoadError(p, _)) => assert_eq!(p, path),
            r => panic!("Expected a file load error, found {:?}", r),
        }
    }
}
