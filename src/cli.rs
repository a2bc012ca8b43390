use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "image-label-uploader")]
#[command(about = "Upload images for analysis and show the detected labels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload images one by one and print their labels
    Upload {
        /// Client identifier sent with every image
        #[arg(short, long, default_value = "")]
        client_id: String,

        /// Analysis endpoint (overrides the configured one)
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Image files to analyse
        files: Vec<PathBuf>,
    },

    /// Show or change the stored configuration
    Config {
        /// Print the current configuration
        #[arg(long)]
        show: bool,

        /// Store a new analysis endpoint
        #[arg(long)]
        set_endpoint: Option<String>,

        /// Restore the default configuration
        #[arg(long)]
        reset: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_args() {
        let cli = Cli::parse_from([
            "image-label-uploader",
            "-v",
            "upload",
            "--client-id",
            " acme ",
            "a.png",
            "b.jpg",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Upload { client_id, endpoint, files } => {
                assert_eq!(client_id, " acme ");
                assert!(endpoint.is_none());
                assert_eq!(files, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_upload_without_inputs_parses() {
        // Missing client id and files are reported by the uploader, not clap.
        let cli = Cli::parse_from(["image-label-uploader", "upload"]);
        match cli.command {
            Commands::Upload { client_id, files, .. } => {
                assert!(client_id.is_empty());
                assert!(files.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_args() {
        let cli = Cli::parse_from([
            "image-label-uploader",
            "config",
            "--show",
            "--set-endpoint",
            "http://localhost:9000/analyze",
        ]);
        match cli.command {
            Commands::Config { show, set_endpoint, reset } => {
                assert!(show);
                assert!(!reset);
                assert_eq!(set_endpoint.as_deref(), Some("http://localhost:9000/analyze"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
