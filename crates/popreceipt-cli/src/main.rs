//! popreceipt - pop receipt で Blob と Table の書き込みを協調させるバッチ
//!
//! ```text
//! popreceipt run              # provision → 全画像を処理 → teardown
//! popreceipt run --keep-resources
//! popreceipt --backend azure pending   # キューに残っている（未完了の）単位
//! popreceipt --backend azure cleanup   # キュー・コンテナ・テーブルを削除
//! ```
//!
//! in-memory バックエンドはプロセスと一緒に消えるので `run` 専用です。

mod backend;
mod cli;
mod logging;

use anyhow::Context;
use clap::Parser;
use popreceipt_core::app::Pipeline;
use serde_json::json;
use tracing::info;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging()?;

    let pipeline = backend::build_pipeline(&cli.args, &cli.command)?;

    match cli.command {
        Command::Run { keep_resources } => run(&pipeline, keep_resources).await,
        Command::Pending { max } => pending(&pipeline, max).await,
        Command::Cleanup => {
            pipeline.teardown().await;
            Ok(())
        }
    }
}

async fn run(pipeline: &Pipeline, keep_resources: bool) -> anyhow::Result<()> {
    pipeline
        .provision()
        .await
        .context("failed to provision storage resources")?;

    let result = pipeline.run_batch().await;

    if keep_resources {
        info!("keeping queue, container and table");
    } else {
        pipeline.teardown().await;
    }

    let report = result.context("batch aborted")?;
    let summary = json!({
        "counts": report.counts(),
        "incomplete": report.incomplete(),
        "units": report.units,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn pending(pipeline: &Pipeline, max: usize) -> anyhow::Result<()> {
    let messages = pipeline
        .pending(max)
        .await
        .context("failed to peek the queue")?;
    info!(count = messages.len(), "messages still in the queue");
    for message in &messages {
        println!(
            "{}\t{}\tdequeued={}",
            message.message_id, message.payload, message.dequeue_count
        );
    }
    Ok(())
}
