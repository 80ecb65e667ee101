use crate::config::schema::JobConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<JobConfig> {
        let path = path.as_ref();
        let config = Self::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<JobConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config: JobConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some("yaml") | Some("yml") => {
                let config: JobConfig = serde_yaml::from_str(&content)?;
                Ok(config)
            }
            Some("toml") => {
                let config: JobConfig = toml::from_str(&content)?;
                Ok(config)
            }
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }
}
