//! Backend - どのストアと検出器で Pipeline を組み立てるか

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use popreceipt_core::app::{AppBuilder, Pipeline, PipelineConfig};
use popreceipt_core::impls::{
    FaceApiClient, InMemoryBlobStore, InMemoryQueue, InMemoryRecordStore, StaticFaceDetector,
};
use popreceipt_core::ports::FaceDetector;
use tracing::warn;

use crate::cli::{Backend, Command, GlobalArgs};

/// 画像を検出にかけるのは `run` だけ。`pending` / `cleanup` はプロセスより長生きするストアが要る
pub fn build_pipeline(args: &GlobalArgs, command: &Command) -> anyhow::Result<Pipeline> {
    let needs_detector = matches!(command, Command::Run { .. });
    if args.backend == Backend::Memory && !needs_detector {
        bail!(
            "`{}` needs a persistent backend; in-memory stores vanish when each command exits (use --backend azure)",
            command.name()
        );
    }

    let config = PipelineConfig::default()
        .with_images_dir(&args.images_dir)
        .with_visibility_delay(Duration::from_secs(args.visibility_delay_secs))
        .with_partition(args.partition.clone());

    let builder = AppBuilder::new()
        .detector(detector(args, needs_detector)?)
        .config(config);

    let builder = match args.backend {
        Backend::Memory => builder
            .queue(Arc::new(InMemoryQueue::new(&args.queue_name)))
            .blob_store(Arc::new(InMemoryBlobStore::new(&args.container_name)))
            .record_store(Arc::new(InMemoryRecordStore::new(&args.table_name))),
        Backend::Azure => azure_stores(builder, args)?,
    };

    builder.build().context("invalid pipeline configuration")
}

fn detector(args: &GlobalArgs, needs_detector: bool) -> anyhow::Result<Arc<dyn FaceDetector>> {
    if let Some(key) = &args.face_key {
        return Ok(Arc::new(FaceApiClient::new(&args.face_endpoint, key)));
    }
    if needs_detector {
        if args.backend == Backend::Azure {
            bail!("--face-key (FACE_SUBSCRIPTION_KEY) is required to run against Azure");
        }
        warn!("no face API key configured; every image will be treated as having no faces");
    }
    Ok(Arc::new(StaticFaceDetector::new()))
}

#[cfg(feature = "azure")]
fn azure_stores(builder: AppBuilder, args: &GlobalArgs) -> anyhow::Result<AppBuilder> {
    use azure_storage::StorageCredentials;
    use popreceipt_core::impls::azure::{AzureBlobStore, AzureQueue, AzureRecordStore};

    let account = args
        .storage_account
        .as_deref()
        .context("--storage-account (AZURE_STORAGE_ACCOUNT) is required for the azure backend")?;
    let key = args
        .storage_access_key
        .clone()
        .context("--storage-access-key (AZURE_STORAGE_ACCESS_KEY) is required for the azure backend")?;
    let credentials = StorageCredentials::access_key(account.to_string(), key);

    Ok(builder
        .queue(Arc::new(AzureQueue::new(
            account,
            credentials.clone(),
            &args.queue_name,
        )))
        .blob_store(Arc::new(AzureBlobStore::new(
            account,
            credentials.clone(),
            &args.container_name,
        )))
        .record_store(Arc::new(AzureRecordStore::new(
            account,
            credentials,
            &args.table_name,
        ))))
}

#[cfg(not(feature = "azure"))]
fn azure_stores(_builder: AppBuilder, _args: &GlobalArgs) -> anyhow::Result<AppBuilder> {
    bail!("this binary was built without Azure support; rebuild with `--features azure`")
}
