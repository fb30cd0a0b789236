use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel;

use super::{CHANNEL_BUFFER, Coordinator};
use crate::config::Config;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_many_startup_folders_do_not_block_startup() {
    let root = tempfile::tempdir().unwrap();
    let mut config = Config::sandboxed(root.path());
    config.serve.ws_port = 0;

    let folders: Vec<_> = (0..CHANNEL_BUFFER + 8)
        .map(|i| {
            let dir = root.path().join(format!("tree-sitter-{i}"));
            std::fs::create_dir_all(&dir).unwrap();
            dir
        })
        .collect();

    let (shutdown_tx, shutdown_rx) = channel::unbounded();
    shutdown_tx.send(()).unwrap();

    let run = Coordinator::with_config(Arc::new(config))
        .with_folders(folders)
        .with_shutdown_signal(shutdown_rx)
        .run();

    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("coordinator did not return after shutdown")
        .unwrap();
}
