//! JSON 설정 파일 저장소
//!
//! 디렉토리 하나를 기준으로 `config.json` 같은 파일을 읽고 씁니다.
//! - 글로벌: `<config_dir>/tally/`
//! - 프로젝트: `<root>/.tally/`

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "tally";
const PROJECT_DIR: &str = ".tally";

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 글로벌 저장소
    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or_else(|| Error::Config("no config directory on this platform".to_string()))
    }

    /// `root` 아래 프로젝트 저장소
    pub fn project(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(PROJECT_DIR))
    }

    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("current directory unavailable: {}", e)))?;
        Ok(Self::project(cwd))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// 파일이 없으면 `None`, 있는데 깨져 있으면 에러
    pub fn load_optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.path_of(name);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Config(format!("{}: {}", path.display(), e)));
            }
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// 없거나 읽을 수 없으면 기본값
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.load_optional(name) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable config file");
                T::default()
            }
        }
    }

    /// 임시 파일에 쓴 뒤 rename
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Config(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.path_of(name);
        let tmp = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(value)?;
        std::fs::write(&tmp, text)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}
