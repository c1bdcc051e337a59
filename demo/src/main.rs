//! Wazo REST client demo
//!
//! Builds a client for the example namespace, reports whether the server
//! answers, then fetches the example resource.
//!
//! ```text
//! wazo-rest-client-demo --host localhost --port 9486 --version 1.0 --http
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wazo_rest_client::{EntryPoints, ExampleClient, PluginCache, VerifyCertificate};

/// Query the example resource of a Wazo REST service
#[derive(Parser, Debug)]
#[command(name = "wazo-rest-client-demo", disable_version_flag = true)]
struct Args {
    /// Server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(long)]
    port: Option<u16>,

    /// API version segment
    #[arg(long, default_value = "")]
    version: String,

    /// Path prefix between host and version
    #[arg(long)]
    prefix: Option<String>,

    /// Authentication token
    #[arg(long, env = "WAZO_TOKEN")]
    token: Option<String>,

    /// Tenant UUID
    #[arg(long)]
    tenant: Option<String>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long)]
    http: bool,

    /// Skip certificate validation
    #[arg(long, conflicts_with = "ca_bundle")]
    insecure: bool,

    /// Validate certificates against this PEM bundle
    #[arg(long)]
    ca_bundle: Option<PathBuf>,

    /// HTTP auth user name
    #[arg(long, requires = "password")]
    username: Option<String>,

    /// HTTP auth password
    #[arg(long, env = "WAZO_PASSWORD", requires = "username")]
    password: Option<String>,

    /// Answer digest challenges instead of sending basic auth
    #[arg(long, requires = "username")]
    digest: bool,

    /// Request timeout in seconds; 0 disables it
    #[arg(long, default_value_t = 10.0)]
    timeout: f64,
}

impl Args {
    fn verify_certificate(&self) -> VerifyCertificate {
        match &self.ca_bundle {
            Some(path) => VerifyCertificate::CaBundle(path.clone()),
            None => VerifyCertificate::Flag(!self.insecure),
        }
    }

    fn timeout(&self) -> Result<Option<Duration>> {
        if self.timeout == 0.0 {
            return Ok(None);
        }
        Duration::try_from_secs_f64(self.timeout)
            .map(Some)
            .with_context(|| format!("invalid timeout: {}", self.timeout))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let entry_points = EntryPoints::new();
    ExampleClient::register(&entry_points);
    let plugins = PluginCache::new(entry_points);

    let mut builder = ExampleClient::builder()
        .with_host(&args.host)
        .with_version(&args.version)
        .with_https(!args.http)
        .with_timeout(args.timeout()?)
        .with_verify_certificate(args.verify_certificate());
    if let Some(port) = args.port {
        builder = builder.with_port(port);
    }
    if let Some(prefix) = &args.prefix {
        builder = builder.with_prefix(prefix);
    }
    if let Some(token) = &args.token {
        builder = builder.with_token(token);
    }
    if let Some(tenant) = &args.tenant {
        builder = builder.with_tenant(tenant);
    }
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        builder = if args.digest {
            builder.with_digest_credentials(username, password)
        } else {
            builder.with_credentials(username, password)
        };
    }

    let client = ExampleClient::from(builder.build(&plugins).context("failed to build client")?);
    info!("Client ready for {}", client.base_url());

    let reachable = client.is_server_reachable();
    println!("{} reachable: {}", client.base_url(), reachable);
    if !reachable {
        return Ok(());
    }

    let example = client
        .example()
        .context("example command is not registered")?;
    let body = example
        .test()
        .with_context(|| format!("GET {} failed", example.base_url()))?;
    println!("{}", String::from_utf8_lossy(&body));

    Ok(())
}
