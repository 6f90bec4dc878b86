use colored::Colorize;
use uptime_operator_config::OperatorConfig;
use uptime_operator_core::{FINALIZER_TOKEN, ObjectMeta, StateManager};

fn lifecycle(meta: &ObjectMeta, remote_id: &str) -> colored::ColoredString {
    if meta.is_deletion_requested() {
        "削除中".red()
    } else if remote_id.is_empty() {
        "未作成".yellow()
    } else if meta.has_finalizer(FINALIZER_TOKEN) {
        "同期済み".green()
    } else {
        "登録中".yellow()
    }
}

pub async fn handle(config: &OperatorConfig) -> anyhow::Result<()> {
    let manager = StateManager::new(&config.state_dir);
    let state = manager.load().await?;

    println!(
        "状態ファイル: {} (更新: {})",
        manager.state_dir().display().to_string().cyan(),
        state.updated_at.format("%Y-%m-%d %H:%M:%S")
    );

    if state.object_count() == 0 {
        println!("{}", "管理中のオブジェクトはありません".dimmed());
        return Ok(());
    }

    if !state.alert_contacts.is_empty() {
        println!();
        println!("{}", "alert-contact".bold());
        for contact in &state.alert_contacts {
            println!(
                "  {} {} id={} type={} value={}",
                lifecycle(&contact.metadata, &contact.status.id),
                contact.key().to_string().cyan(),
                contact.status.id,
                contact.spec.contact_type,
                contact.spec.value
            );
        }
    }

    if !state.monitors.is_empty() {
        println!();
        println!("{}", "monitor".bold());
        for monitor in &state.monitors {
            println!(
                "  {} {} id={} status={} alert-contacts=[{}]",
                lifecycle(&monitor.metadata, &monitor.status.id),
                monitor.key().to_string().cyan(),
                monitor.status.id,
                monitor.status.status,
                monitor.status.alert_contacts.join(",")
            );
        }
    }

    if !state.accounts.is_empty() {
        println!();
        println!("{}", "account".bold());
        for account in &state.accounts {
            let s = &account.status;
            println!(
                "  {} {} up={} down={} paused={} ({}/{} monitors)",
                account.key().to_string().cyan(),
                s.email,
                s.up_monitors.to_string().green(),
                s.down_monitors.to_string().red(),
                s.paused_monitors,
                s.up_monitors + s.down_monitors + s.paused_monitors,
                s.monitor_limit
            );
        }
    }

    Ok(())
}
