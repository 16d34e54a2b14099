use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloud_storage_crud::{
    app::{self, AppBuilder, AppConfig, AppServices},
    domain::{Outcome, StorageError},
    ports::{BucketService, ObjectService},
    ListBucketsRequest,
};
use futures::TryStreamExt;
use http::StatusCode;
use std::{path::PathBuf, process::ExitCode};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cloud-storage-cli")]
#[command(about = "Create, retrieve, list and delete cloud storage buckets and objects", long_about = None)]
struct Cli {
    /// Storage backend type (memory or gcs)
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// Path of the service account key file
    #[arg(long, env = "GCP_CREDENTIALS")]
    gcp_credentials: Option<String>,

    /// Project owning the buckets, defaults to the key file's project
    #[arg(long, env = "GCP_PROJECT_ID")]
    gcp_project_id: Option<String>,

    /// Location for new buckets, EU when unset
    #[arg(long, env = "DEFAULT_LOCATION")]
    default_location: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage buckets
    Bucket {
        #[command(subcommand)]
        command: BucketCommands,
    },

    /// Manage objects inside a bucket
    Object {
        #[command(subcommand)]
        command: ObjectCommands,
    },
}

#[derive(Subcommand, Debug)]
enum BucketCommands {
    /// Create a bucket
    Create {
        /// Bucket name
        name: String,
        /// Bucket location, e.g. EU or us-east1
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Show a bucket
    Get {
        /// Bucket name
        name: String,
    },

    /// List buckets
    List {
        /// Stop after this many buckets
        #[arg(short, long)]
        max_results: Option<usize>,
        /// Only list buckets whose name starts with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Delete a bucket
    Delete {
        /// Bucket name
        name: String,
        /// Delete every object first
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ObjectCommands {
    /// Upload a file
    Put {
        bucket: String,
        /// Object name
        name: String,
        /// File to upload
        file: PathBuf,
    },

    /// Download an object
    Get {
        bucket: String,
        /// Object name
        name: String,
        /// Output file path
        file: PathBuf,
    },

    /// List objects with their size
    List { bucket: String },

    /// List object names only
    Names { bucket: String },

    /// Download every object into a directory
    DownloadAll { bucket: String, directory: PathBuf },

    /// Delete an object
    Delete {
        bucket: String,
        /// Object name
        name: String,
    },
}

impl Cli {
    /// Read the flags through the same parser as the environment
    fn to_app_config(&self) -> Result<AppConfig> {
        AppConfig::from_lookup(|key| match key {
            app::STORAGE_BACKEND => Some(self.storage_backend.clone()),
            app::GCP_CREDENTIALS => self.gcp_credentials.clone(),
            app::GCP_PROJECT_ID => self.gcp_project_id.clone(),
            app::DEFAULT_LOCATION => self.default_location.clone(),
            _ => None,
        })
        .context("Invalid configuration")
    }

    fn init_logging(&self) {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| self.log_level.as_str().into());

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Run one command, printing results to stdout
///
/// Read-only commands print what they found and return no outcome.
async fn run(command: Commands, app: &AppServices) -> Result<Option<Outcome>, StorageError> {
    let buckets = &app.bucket_service;
    let objects = &app.object_service;

    match command {
        Commands::Bucket { command } => match command {
            BucketCommands::Create { name, location } => {
                buckets.create_bucket(&name, location.as_deref()).await.map(Some)
            }
            BucketCommands::Get { name } => {
                let bucket = buckets.retrieve_bucket(&name).await?;
                let created = bucket
                    .created
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", bucket.name, bucket.location, created);
                Ok(None)
            }
            BucketCommands::List {
                max_results,
                prefix,
            } => {
                let request = ListBucketsRequest {
                    max_results,
                    prefix,
                };
                let mut listing = buckets.retrieve_buckets(request);
                while let Some(bucket) = listing.try_next().await? {
                    println!("{}\t{}", bucket.name, bucket.location);
                }
                Ok(None)
            }
            BucketCommands::Delete { name, force } => {
                buckets.delete_bucket(&name, force).await.map(Some)
            }
        },
        Commands::Object { command } => match command {
            ObjectCommands::Put { bucket, name, file } => {
                objects.create_object(&bucket, &name, &file).await.map(Some)
            }
            ObjectCommands::Get { bucket, name, file } => {
                objects.retrieve_object(&bucket, &name, &file).await.map(Some)
            }
            ObjectCommands::List { bucket } => {
                let mut listing = objects.retrieve_objects(&bucket).await?;
                while let Some(object) = listing.try_next().await? {
                    println!("{}\t{}", object.key, object.size);
                }
                Ok(None)
            }
            ObjectCommands::Names { bucket } => {
                let mut names = objects.retrieve_object_names(&bucket).await?;
                while let Some(name) = names.try_next().await? {
                    println!("{}", name);
                }
                Ok(None)
            }
            ObjectCommands::DownloadAll { bucket, directory } => {
                objects.download_objects(&bucket, &directory).await.map(Some)
            }
            ObjectCommands::Delete { bucket, name } => {
                objects.delete_object(&bucket, &name).await.map(Some)
            }
        },
    }
}

fn report_error(err: &StorageError) -> String {
    format!(
        "error [{}] ({}): {}",
        err.kind(),
        StatusCode::from(err).as_u16(),
        err
    )
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    let config = cli.to_app_config()?;
    debug!(backend = %cli.storage_backend, location = %config.default_location, "configuration loaded");

    let app = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    match run(cli.command, &app).await {
        Ok(outcome) => {
            if let Some(outcome) = outcome {
                println!("{}", outcome);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", report_error(&err));
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_storage_crud::app::BackendKind;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "cloud-storage-cli",
            "--storage-backend",
            "gcs",
            "--gcp-credentials",
            "/etc/gcp/key.json",
            "bucket",
            "create",
            "test-bucket",
            "--location",
            "eu",
        ]);

        match &cli.command {
            Commands::Bucket {
                command: BucketCommands::Create { name, location },
            } => {
                assert_eq!(name, "test-bucket");
                assert_eq!(location.as_deref(), Some("eu"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        match cli.to_app_config().unwrap().backend {
            BackendKind::Gcs(gcs) => {
                assert_eq!(gcs.credentials_path, PathBuf::from("/etc/gcp/key.json"))
            }
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn test_object_commands() {
        let cli = Cli::parse_from([
            "cloud-storage-cli",
            "object",
            "download-all",
            "test-bucket",
            "/tmp/out",
        ]);
        assert!(matches!(
            cli.command,
            Commands::Object {
                command: ObjectCommands::DownloadAll { .. }
            }
        ));

        let cli = Cli::parse_from(["cloud-storage-cli", "bucket", "delete", "old", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Bucket {
                command: BucketCommands::Delete { force: true, .. }
            }
        ));
    }

    fn cli(storage_backend: &str) -> Cli {
        Cli {
            storage_backend: storage_backend.to_string(),
            gcp_credentials: None,
            gcp_project_id: None,
            default_location: None,
            log_level: "warn".to_string(),
            command: Commands::Bucket {
                command: BucketCommands::List {
                    max_results: None,
                    prefix: None,
                },
            },
        }
    }

    #[test]
    fn test_gcs_backend_requires_credentials() {
        let err = cli("gcs").to_app_config().unwrap_err();
        assert!(format!("{err:#}").contains("GCP_CREDENTIALS"));

        let mut with_key = cli("gcs");
        with_key.gcp_credentials = Some("/etc/gcp/key.json".to_string());
        assert!(matches!(
            with_key.to_app_config().unwrap().backend,
            BackendKind::Gcs(_)
        ));
    }

    #[test]
    fn test_flags_share_environment_parsing() {
        let config = cli("memory").to_app_config().unwrap();
        assert!(matches!(config.backend, BackendKind::InMemory));
        assert_eq!(config.default_location.as_str(), "EU");

        let mut lower = cli("memory");
        lower.default_location = Some("us-east1".to_string());
        assert_eq!(
            lower.to_app_config().unwrap().default_location.as_str(),
            "US-EAST1"
        );

        assert!(cli("s3").to_app_config().is_err());

        let mut bad_location = cli("memory");
        bad_location.default_location = Some("not a region".to_string());
        let err = bad_location.to_app_config().unwrap_err();
        assert!(format!("{err:#}").contains("DEFAULT_LOCATION"));
    }

    #[test]
    fn test_report_error() {
        let err = StorageError::ObjectNotFound {
            bucket: "test-bucket".to_string(),
            key: "missing.txt".to_string(),
        };
        assert_eq!(
            report_error(&err),
            "error [not_found] (404): Object not found: test-bucket/missing.txt"
        );
    }

    #[tokio::test]
    async fn test_run_against_memory_backend() {
        let app = AppBuilder::new().build().await.unwrap();

        let outcome = run(
            Commands::Bucket {
                command: BucketCommands::Create {
                    name: "test-bucket".to_string(),
                    location: None,
                },
            },
            &app,
        )
        .await
        .unwrap();
        assert_eq!(outcome.unwrap().to_string(), "Created (201)");

        for command in [
            Commands::Bucket {
                command: BucketCommands::Get {
                    name: "test-bucket".to_string(),
                },
            },
            Commands::Bucket {
                command: BucketCommands::List {
                    max_results: None,
                    prefix: None,
                },
            },
            Commands::Object {
                command: ObjectCommands::List {
                    bucket: "test-bucket".to_string(),
                },
            },
            Commands::Object {
                command: ObjectCommands::Names {
                    bucket: "test-bucket".to_string(),
                },
            },
        ] {
            assert!(run(command, &app).await.unwrap().is_none());
        }

        let err = run(
            Commands::Object {
                command: ObjectCommands::Delete {
                    bucket: "test-bucket".to_string(),
                    name: "missing.txt".to_string(),
                },
            },
            &app,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), cloud_storage_crud::ErrorKind::NotFound);

        let outcome = run(
            Commands::Bucket {
                command: BucketCommands::Delete {
                    name: "test-bucket".to_string(),
                    force: false,
                },
            },
            &app,
        )
        .await
        .unwrap();
        assert_eq!(outcome.unwrap().to_string(), "Deleted (204)");
    }
}
