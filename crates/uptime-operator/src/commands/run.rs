use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uptime_operator::{
    AccountController, AlertContactController, ControllerRunner, MonitorController, Stores,
    parse_manifest_file, sync_manifest,
};
use uptime_operator_config::OperatorConfig;
use uptime_operator_core::StateManager;
use uptimerobot_client::{ClientConfig, UptimeRobotClient};

/// 連続した変更をまとめて保存するまでの待ち時間
const PERSIST_DEBOUNCE: Duration = Duration::from_millis(200);

pub async fn handle(config: OperatorConfig, manifest: Option<PathBuf>) -> anyhow::Result<()> {
    let manifest_path = super::resolve_manifest(manifest)?;
    let api_key = config.require_api_key()?;

    let client = Arc::new(UptimeRobotClient::new(
        ClientConfig::new(api_key)
            .with_base_url(config.api_url.as_str())
            .with_timeout(config.request_timeout()),
    )?);

    let state = Arc::new(StateManager::new(&config.state_dir));
    let lock = state.acquire_lock().await?;
    let stores = Stores::from_state(state.load().await?);

    println!("{}", "uptime-operator を起動中...".blue());
    println!("マニフェスト: {}", manifest_path.display().to_string().cyan());
    println!("状態: {}", state.state_dir().display().to_string().cyan());

    // 起動時のマニフェストが壊れていれば起動しない
    let declared = parse_manifest_file(&manifest_path)?;
    let report = sync_manifest(&stores, &declared).await?;
    info!(%report, objects = declared.object_count(), "initial manifest sync");

    let runner = ControllerRunner::new(config.max_concurrent_reconciles, config.retry_delay())
        .with_controller(Arc::new(AlertContactController::new(
            stores.alert_contacts.clone(),
            Arc::clone(&client),
            config.alert_contact_requeue(),
        )))
        .with_controller(Arc::new(MonitorController::new(
            stores.monitors.clone(),
            stores.alert_contacts.clone(),
            Arc::clone(&client),
            config.monitor_requeue(),
        )))
        .with_controller(Arc::new(AccountController::new(
            stores.accounts.clone(),
            Arc::clone(&client),
            config.account_requeue(),
        )));

    let mut background = JoinSet::new();
    background.spawn(manifest_loop(
        stores.clone(),
        manifest_path,
        config.manifest_poll_interval(),
    ));
    background.spawn(persist_loop(stores.clone(), Arc::clone(&state)));

    println!("{}", "✓ コントロールループを開始しました (Ctrl-C で停止)".green());
    runner.run(shutdown_signal()).await;
    background.abort_all();

    state.save(&stores.snapshot().await).await?;
    lock.release().await?;
    println!("{}", "✓ 停止しました".green());
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl-C"),
        Err(e) => {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

/// マニフェストを定期的に読み直してストアへ反映する
async fn manifest_loop(stores: Stores, path: PathBuf, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // 初回は起動時に同期済み
    ticker.tick().await;

    loop {
        ticker.tick().await;
        // 読めないマニフェストは宣言の削除として扱わない
        let declared = match parse_manifest_file(&path) {
            Ok(declared) => declared,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "manifest unreadable, keeping current declarations");
                continue;
            }
        };
        match sync_manifest(&stores, &declared).await {
            Ok(report) if report.is_noop() => {}
            Ok(report) => info!(%report, "manifest synced"),
            Err(e) => warn!(error = %e, "manifest sync failed"),
        }
    }
}

/// ストアの変更を状態ファイルへ書き出す
async fn persist_loop(stores: Stores, state: Arc<StateManager>) {
    let [mut contacts, mut monitors, mut accounts] = stores.watch_all();

    loop {
        let closed = tokio::select! {
            r = contacts.recv() => matches!(r, Err(RecvError::Closed)),
            r = monitors.recv() => matches!(r, Err(RecvError::Closed)),
            r = accounts.recv() => matches!(r, Err(RecvError::Closed)),
        };
        if closed {
            break;
        }

        tokio::time::sleep(PERSIST_DEBOUNCE).await;
        while contacts.try_recv().is_ok() {}
        while monitors.try_recv().is_ok() {}
        while accounts.try_recv().is_ok() {}

        if let Err(e) = state.save(&stores.snapshot().await).await {
            error!(error = %e, "failed to persist state");
        }
    }
}
