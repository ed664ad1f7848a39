use std::path::{Path, PathBuf};

use crate::error::AppError;

pub const DB_PATH_ENV: &str = "GOALSHEET_DB";
const DATA_DIR: &str = ".goalsheet";
const DB_FILE: &str = "goalsheet.db";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn resolve(explicit: Option<PathBuf>, home: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            if path.as_os_str().is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "--db (or {DB_PATH_ENV}) is empty"
                )));
            }
            return Ok(Self::new(path));
        }
        let home = home.ok_or_else(|| {
            AppError::InvalidInput(format!(
                "unable to resolve home directory; pass --db or set {DB_PATH_ENV}"
            ))
        })?;
        Ok(Self::new(default_db_path(home)))
    }

    pub fn from_env(explicit: Option<PathBuf>) -> Result<Self, AppError> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::resolve(explicit, home.as_deref())
    }

    pub fn lock_path(&self) -> PathBuf {
        self.db_path.with_extension("lock")
    }
}

pub fn default_db_path(home: &Path) -> PathBuf {
    home.join(DATA_DIR).join(DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/x.db")), Some(Path::new("/home/u")))
            .expect("config");
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.lock_path(), PathBuf::from("/tmp/x.lock"));
    }

    #[test]
    fn falls_back_to_home() {
        let config = Config::resolve(None, Some(Path::new("/home/u"))).expect("config");
        assert_eq!(
            config.db_path,
            PathBuf::from("/home/u/.goalsheet/goalsheet.db")
        );
    }

    #[test]
    fn errors_without_any_location() {
        let err = Config::resolve(None, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let err = Config::resolve(Some(PathBuf::new()), None).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
