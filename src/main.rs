use clap::Parser;
use marker_patch::utils::{logger, validation::Validate};
use marker_patch::{CliConfig, PatchEngine, Patcher, PatcherOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting marker-patch CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let job = config.to_job()?;

    // 創建修補器並運行
    let patcher = Patcher::new(PatcherOptions {
        dry_run: config.dry_run,
    });
    let engine = PatchEngine::new(patcher, vec![job]);

    match engine.run() {
        Ok(summary) => {
            if let Some(outcome) = summary.outcomes.first() {
                if outcome.dry_run {
                    tracing::info!("🔍 Dry run finished, nothing was written");
                    println!(
                        "🔍 Dry run: {} bytes in, {} bytes would be written",
                        outcome.bytes_read, outcome.bytes_written
                    );
                    println!("📁 Target: {}", outcome.output.display());
                } else {
                    tracing::info!("✅ Patch applied successfully!");
                    tracing::info!("📁 Output written to: {}", outcome.output.display());
                    println!("✅ Patch applied successfully!");
                    println!("📁 Output written to: {}", outcome.output.display());
                }
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Patch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                marker_patch::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                marker_patch::utils::error::ErrorSeverity::Medium => 2, // 環境錯誤
                marker_patch::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                marker_patch::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
