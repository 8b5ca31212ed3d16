use clap::Parser;
use marker_patch::config::plan::PatchPlan;
use marker_patch::utils::{logger, validation::Validate};
use marker_patch::{PatchEngine, Patcher, PatcherOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "toml-patch")]
#[command(about = "Marker patch tool with TOML plan support")]
struct Args {
    /// Path to TOML plan file
    #[arg(short, long, default_value = "patch-plan.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would change without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based patch tool");
    tracing::info!("📁 Loading plan from: {}", args.config);

    // 載入 TOML 計畫
    let plan = match PatchPlan::from_file(&args.config) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("❌ Failed to load plan file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證計畫
    if let Err(e) = plan.validate() {
        tracing::error!("❌ Plan validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Plan loaded and validated successfully");

    // 顯示計畫摘要
    display_plan_summary(&plan, &args);

    let jobs = plan.get_jobs()?;
    let on_failure = plan.on_failure()?;

    // 創建修補引擎並運行
    let patcher = Patcher::new(PatcherOptions {
        dry_run: args.dry_run,
    });
    let engine = PatchEngine::new_with_policy(patcher, jobs, on_failure);

    match engine.run() {
        Ok(summary) => {
            tracing::info!(
                "✅ Plan '{}' finished in {:?}",
                plan.plan.name,
                summary.total_duration
            );
            println!(
                "✅ Plan finished: {} applied, {} failed, {} skipped",
                summary.outcomes.len(),
                summary.failures.len(),
                summary.skipped.len()
            );

            for failure in &summary.failures {
                eprintln!("❌ {}: {}", failure.job, failure.message);
                eprintln!("💡 建議: {}", failure.suggestion);
            }

            // 匯出執行報告
            if let Some(report_path) = &args.report {
                let report_json = serde_json::to_string_pretty(&summary.to_json())?;
                std::fs::write(report_path, report_json)?;
                tracing::info!("📊 Run report exported to: {}", report_path.display());
                println!("📊 Report exported to: {}", report_path.display());
            }

            if !summary.succeeded() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Plan failed: {} (Category: {:?}, Severity: {:?})",
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

fn display_plan_summary(plan: &PatchPlan, args: &Args) {
    println!("📋 Patch Plan Summary:");
    println!("  Plan: {} v{}", plan.plan.name, plan.plan.version);
    println!("  Description: {}", plan.plan.description);
    println!("  Total Jobs: {}", plan.jobs.len());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
    println!("📝 Job Order:");
    for (index, job) in plan.jobs.iter().enumerate() {
        let status = if job.enabled.unwrap_or(true) {
            "✅"
        } else {
            "⏸️"
        };
        println!(
            "  {}. {} {} ({}) - {} -> {}",
            index + 1,
            status,
            job.name,
            job.mode.as_deref().unwrap_or("splice"),
            job.input,
            job.output.as_deref().unwrap_or(&job.input)
        );

        if let Some(description) = &job.description {
            println!("     {}", description);
        }
    }
    println!();
}
