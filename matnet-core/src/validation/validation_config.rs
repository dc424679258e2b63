use serde::{Deserialize, Serialize};

/// options of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// modes whose subgraphs are checked for connectivity
    #[serde(default = "default_modes")]
    pub modes: Vec<String>,
    /// links longer than this are reported
    #[serde(default = "default_link_length_threshold")]
    pub link_length_threshold: f64,
    /// numeric link attributes expected to hold whole numbers
    #[serde(default = "default_integer_attributes")]
    pub integer_attributes: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            modes: default_modes(),
            link_length_threshold: default_link_length_threshold(),
            integer_attributes: default_integer_attributes(),
        }
    }
}

fn default_modes() -> Vec<String> {
    vec![String::from("car"), String::from("walk"), String::from("bike")]
}

fn default_link_length_threshold() -> f64 {
    1000.0
}

fn default_integer_attributes() -> Vec<String> {
    vec![String::from("capacity"), String::from("permlanes")]
}
