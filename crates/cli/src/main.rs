//! SSO client CLI for signing and verifying manual-login requests.
//!
//! This tool provides commands for:
//! - Printing the signed header set for a request using configured credentials
//! - Inspecting canonical strings and body hashes
//! - Verifying signatures against a public key
//! - Generating PKCE values
//!
//! Nothing is sent over the network; output is printed for use with other tools.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod config;
mod error;
mod inspect;
mod logging;
mod sign;

use error::CliError;
use sso_client_common::constants::DEFAULT_PATH_PREFIX;

#[derive(Parser)]
#[command(name = "ssosign")]
#[command(about = "Sign and verify SSO manual-login requests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a request and print the outbound headers
    Sign {
        /// Path to the TOML configuration file
        #[arg(long, short, env = "SSO_CLIENT_CONFIG")]
        config: PathBuf,

        /// HTTP method
        #[arg(long, short, default_value = "POST")]
        method: String,

        /// Request path on the identity server, including the gateway prefix
        #[arg(long, short)]
        path: String,

        /// JSON request body
        #[arg(long, short)]
        body: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Print the API key instead of a redaction marker
        #[arg(long)]
        show_secrets: bool,
    },

    /// Print the canonical string for fixed request fields
    Canonical {
        /// HTTP method
        #[arg(long, short)]
        method: String,

        /// Absolute request URL
        #[arg(long, short)]
        url: String,

        /// JSON request body
        #[arg(long, short)]
        body: Option<String>,

        /// Value of the X-Timestamp header
        #[arg(long)]
        timestamp: String,

        /// Value of the X-Nonce header
        #[arg(long)]
        nonce: String,

        /// Value of the X-Key-Id header
        #[arg(long)]
        key_id: String,

        /// Gateway prefix stripped from the path
        #[arg(long, default_value = DEFAULT_PATH_PREFIX)]
        prefix: String,
    },

    /// Print the body hash of a JSON body
    BodyHash {
        /// JSON request body; omitted means an empty body
        #[arg(long, short)]
        body: Option<String>,
    },

    /// Verify a signature over a canonical string
    Verify {
        /// Path to the SPKI public key PEM
        #[arg(long)]
        public_key: PathBuf,

        /// Path to a file holding the canonical string
        #[arg(long)]
        canonical_file: PathBuf,

        /// Base64 signature from the X-Signature header
        #[arg(long)]
        signature: String,
    },

    /// Generate a PKCE code verifier, challenge, state and nonce
    Pkce {
        /// Configuration file; when given, also prints the authorization URL
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Sign a sample request with the configured key and verify it
    SelfTest {
        /// Path to the TOML configuration file
        #[arg(long, short, env = "SSO_CLIENT_CONFIG")]
        config: PathBuf,

        /// Path to the SPKI public key PEM matching the configured private key
        #[arg(long)]
        public_key: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Sign {
            config,
            method,
            path,
            body,
            format,
            show_secrets,
        } => sign::sign(
            &config,
            &method,
            &path,
            body.as_deref(),
            format,
            show_secrets,
        ),
        Commands::Canonical {
            method,
            url,
            body,
            timestamp,
            nonce,
            key_id,
            prefix,
        } => inspect::canonical(&inspect::CanonicalArgs {
            method: &method,
            url: &url,
            body: body.as_deref(),
            timestamp: &timestamp,
            nonce: &nonce,
            key_id: &key_id,
            prefix: &prefix,
        }),
        Commands::BodyHash { body } => inspect::body_hash(body.as_deref()),
        Commands::Verify {
            public_key,
            canonical_file,
            signature,
        } => inspect::verify(&public_key, &canonical_file, &signature),
        Commands::Pkce { config } => inspect::pkce(config.as_deref()),
        Commands::SelfTest { config, public_key } => sign::self_test(&config, &public_key),
    }
}
