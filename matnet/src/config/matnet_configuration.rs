use crate::model::MatnetCliError;
use h3o::Resolution;
use matnet_core::validation::ValidationConfig;
use serde::{Deserialize, Serialize};

/// behaviors of a matnet run
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct MatnetConfiguration {
    #[serde(default)]
    pub validation: ValidationConfig,
    /// size of the worker pool used when fusing simplified links
    pub simplify_workers: Option<usize>,
    /// H3 resolution of node spatial tokens, used to match nodes when merging
    spatial_token_resolution: Option<u8>,
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for MatnetConfiguration {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            simplify_workers: None,
            spatial_token_resolution: Some(15),
            overwrite: false,
        }
    }
}

impl MatnetConfiguration {
    pub fn get_simplify_workers(&self) -> usize {
        self.simplify_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn get_spatial_token_resolution(&self) -> Result<Resolution, MatnetCliError> {
        let value = self.spatial_token_resolution.unwrap_or(15);
        Resolution::try_from(value).map_err(|e| {
            MatnetCliError::ConfigurationError(format!(
                "invalid spatial token resolution {value}: {e}"
            ))
        })
    }
}

impl TryFrom<&String> for MatnetConfiguration {
    type Error = MatnetCliError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let read = |f: &String| {
            std::fs::read_to_string(f).map_err(|e| {
                MatnetCliError::ConfigurationError(format!("failure reading {f}: {e}"))
            })
        };
        if f.ends_with(".toml") {
            let s = read(f)?;
            toml::from_str(&s).map_err(|e| {
                MatnetCliError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else if f.ends_with(".json") {
            let s = read(f)?;
            serde_json::from_str(&s).map_err(|e| {
                MatnetCliError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else {
            Err(MatnetCliError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MatnetConfiguration;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let conf: MatnetConfiguration = toml::from_str(
            r#"
            simplify_workers = 2
            [validation]
            modes = ["car", "bus"]
            "#,
        )
        .unwrap();
        assert_eq!(conf.get_simplify_workers(), 2);
        assert_eq!(conf.validation.modes, vec!["car", "bus"]);
        assert_eq!(conf.validation.link_length_threshold, 1000.0);
        assert!(conf.get_spatial_token_resolution().is_ok());
        assert!(!conf.overwrite);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = MatnetConfiguration::try_from(&String::from("conf.yaml"));
        assert!(result.is_err());
    }
}
