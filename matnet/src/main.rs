use clap::{Parser, Subcommand};
use matnet::{
    config::MatnetConfiguration,
    model::{write_change_log, MatnetCliError, NetworkSnapshot},
};
use matnet_core::{
    model::network::Network,
    validation::{validate, ValidationReport},
};
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct MatnetAppArguments {
    #[command(subcommand)]
    app: App,
    #[arg(long, global = true, help = "path to .toml or .json file with matnet parameters")]
    configuration_file: Option<String>,
}

#[derive(Subcommand)]
pub enum App {
    /// writes a validation report for a network
    Validate {
        #[arg(long, help = "path to network snapshot .json file")]
        network_file: String,
        #[arg(long, help = "output path for the validation report")]
        output_file: Option<String>,
    },
    /// simplifies a network, writing the result with its change log
    Simplify {
        #[arg(long, help = "path to network snapshot .json file")]
        network_file: String,
        #[arg(long, help = "output path for network dataset")]
        output_directory: String,
        #[arg(long, help = "validate the simplified network")]
        validate: bool,
    },
    /// adds a second network to the first, writing the result with its change log
    Merge {
        #[arg(long, help = "path to the receiving network snapshot .json file")]
        network_file: String,
        #[arg(long, help = "path to the network snapshot .json file to add")]
        other_network_file: String,
        #[arg(long, help = "output path for network dataset")]
        output_directory: String,
        #[arg(long, help = "validate the merged network")]
        validate: bool,
    },
}

mod filenames {
    pub const NETWORK: &str = "network.json";
    pub const CHANGE_LOG: &str = "change_log.csv";
    pub const VALIDATION_REPORT: &str = "validation_report.json";
}

/// runs the app. the result is false only when a validation was run and
/// found the network invalid.
pub fn run(args: &MatnetAppArguments) -> Result<bool, MatnetCliError> {
    env_logger::init();
    let conf = match &args.configuration_file {
        None => Ok(MatnetConfiguration::default()),
        Some(f) => {
            log::info!("reading matnet configuration from {f}");
            MatnetConfiguration::try_from(f)
        }
    }?;
    let resolution = conf.get_spatial_token_resolution()?;
    let load = |f: &String| NetworkSnapshot::read(Path::new(f))?.into_network(resolution);

    match &args.app {
        App::Validate {
            network_file,
            output_file,
        } => {
            let network = load(network_file)?;
            let report = validate(&network, &conf.validation)?;
            match output_file {
                Some(f) => write_report(&report, Path::new(f), conf.overwrite)?,
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            Ok(report.is_valid_network)
        }
        App::Simplify {
            network_file,
            output_directory,
            validate,
        } => {
            let mut network = load(network_file)?;
            let mapping = network.simplify(conf.get_simplify_workers())?;
            log::info!("simplify replaced {} links", mapping.len());
            finish(&network, Path::new(output_directory), *validate, &conf)
        }
        App::Merge {
            network_file,
            other_network_file,
            output_directory,
            validate,
        } => {
            let mut network = load(network_file)?;
            let other = load(other_network_file)?;
            let summary = network.add(other)?;
            log::info!(
                "merge mapped {} nodes and {} links",
                summary.node_mapping.len(),
                summary.link_mapping.len()
            );
            finish(&network, Path::new(output_directory), *validate, &conf)
        }
    }
}

/// writes the network and its change log, validating first when requested.
fn finish(
    network: &Network,
    output_directory: &Path,
    validate_network: bool,
    conf: &MatnetConfiguration,
) -> Result<bool, MatnetCliError> {
    if !output_directory.is_dir() && std::fs::create_dir_all(output_directory).is_err() {
        let dirname = output_directory.as_os_str().to_string_lossy();
        return Err(MatnetCliError::OutputError(format!(
            "unable to create directory {dirname}"
        )));
    }
    let is_valid = match validate_network {
        true => {
            let report = validate(network, &conf.validation)?;
            let path = output_directory.join(filenames::VALIDATION_REPORT);
            write_report(&report, &path, conf.overwrite)?;
            report.is_valid_network
        }
        false => true,
    };
    NetworkSnapshot::from_network(network)
        .write(&output_directory.join(filenames::NETWORK), conf.overwrite)?;
    let n_events = write_change_log(
        network.change_log(),
        &output_directory.join(filenames::CHANGE_LOG),
        conf.overwrite,
    )?;
    log::info!("wrote network and {n_events} change log events");
    Ok(is_valid)
}

fn write_report(report: &ValidationReport, path: &Path, overwrite: bool) -> Result<(), MatnetCliError> {
    if path.exists() && !overwrite {
        return Err(MatnetCliError::OutputError(format!(
            "{} already exists, set overwrite to replace it",
            path.to_string_lossy()
        )));
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

fn main() {
    let args = MatnetAppArguments::parse();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("network failed validation");
            std::process::exit(2);
        }
        Err(e) => {
            log::error!("matnet failed: {e}");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
