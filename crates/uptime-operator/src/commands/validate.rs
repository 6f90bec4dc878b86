use colored::Colorize;
use std::path::PathBuf;
use uptime_operator::parse_manifest_file;

pub fn handle(manifest: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "マニフェストを検証中...".blue());

    let path = super::resolve_manifest(manifest)?;
    println!("マニフェスト: {}", path.display().to_string().cyan());

    match parse_manifest_file(&path) {
        Ok(manifest) => {
            println!("{}", "✓ マニフェストは正常です！".green().bold());
            println!();
            println!("サマリー:");
            println!("  alert-contact: {}個", manifest.alert_contacts.len());
            for contact in &manifest.alert_contacts {
                println!(
                    "    - {} ({}: {})",
                    contact.key().to_string().cyan(),
                    contact.spec.contact_type,
                    contact.spec.value
                );
            }
            println!("  monitor: {}個", manifest.monitors.len());
            for monitor in &manifest.monitors {
                let selector = match &monitor.spec.alert_contacts {
                    Some(selector) if selector.match_labels.is_empty() => "全て".to_string(),
                    Some(selector) => selector.to_string(),
                    None => "(なし)".to_string(),
                };
                println!(
                    "    - {} ({} {}, {}秒, 通知先: {})",
                    monitor.key().to_string().cyan(),
                    monitor.spec.monitor_type,
                    monitor.spec.url,
                    monitor.spec.interval,
                    selector
                );
            }
            println!("  account: {}個", manifest.accounts.len());
            for account in &manifest.accounts {
                println!("    - {}", account.key().to_string().cyan());
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ マニフェストエラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
