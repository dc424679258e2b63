mod matnet_configuration;

pub use matnet_configuration::MatnetConfiguration;
