//! Cli - コマンドライン引数と環境変数

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use popreceipt_core::app::DEFAULT_IMAGES_DIR;
use popreceipt_core::domain::PartitionStrategy;
use popreceipt_core::impls::DEFAULT_FACE_ENDPOINT;

/// Coordinate blob and table writes through a queue message's pop receipt.
#[derive(Debug, Parser)]
#[command(name = "popreceipt", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub args: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provision resources, process every image, then tear down.
    Run {
        /// Keep the queue, container and table after the run.
        #[arg(long, env = "POPRECEIPT_KEEP_RESOURCES")]
        keep_resources: bool,
    },
    /// List messages still in the queue (units that never completed).
    Pending {
        #[arg(long, default_value_t = 32)]
        max: usize,
    },
    /// Delete the queue, container and table.
    Cleanup,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Run { .. } => "run",
            Command::Pending { .. } => "pending",
            Command::Cleanup => "cleanup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// In-process stores; state lives only as long as the command, so only `run` accepts it.
    Memory,
    /// Azure Storage (requires the `azure` feature).
    Azure,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Directory whose *.jpg files are processed.
    #[arg(long, env = "POPRECEIPT_IMAGES_DIR", default_value = DEFAULT_IMAGES_DIR, global = true)]
    pub images_dir: PathBuf,

    #[arg(long, env = "POPRECEIPT_BACKEND", value_enum, default_value_t = Backend::Memory, global = true)]
    pub backend: Backend,

    #[arg(long, env = "AZURE_STORAGE_ACCOUNT", global = true)]
    pub storage_account: Option<String>,

    #[arg(long, env = "AZURE_STORAGE_ACCESS_KEY", hide_env_values = true, global = true)]
    pub storage_access_key: Option<String>,

    #[arg(long, env = "FACE_ENDPOINT", default_value = DEFAULT_FACE_ENDPOINT, global = true)]
    pub face_endpoint: String,

    #[arg(long, env = "FACE_SUBSCRIPTION_KEY", hide_env_values = true, global = true)]
    pub face_key: Option<String>,

    #[arg(long, env = "POPRECEIPT_QUEUE_NAME", default_value = "samplequeue", global = true)]
    pub queue_name: String,

    #[arg(long, env = "POPRECEIPT_CONTAINER_NAME", default_value = "samplecontainer", global = true)]
    pub container_name: String,

    #[arg(long, env = "POPRECEIPT_TABLE_NAME", default_value = "sampletable", global = true)]
    pub table_name: String,

    /// Visibility delay of the announce message. Must exceed the worst-case time to process one image.
    #[arg(long, env = "POPRECEIPT_VISIBILITY_DELAY_SECS", default_value_t = 900, global = true)]
    pub visibility_delay_secs: u64,

    /// Partition key for records: a fixed name, or `dated` for the UTC processing date.
    #[arg(long, env = "POPRECEIPT_PARTITION", default_value = "FaceImages", global = true)]
    pub partition: PartitionStrategy,
}
