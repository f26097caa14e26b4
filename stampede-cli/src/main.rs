use anyhow::{Context, Result};
use clap::Parser;
use stampede_config::validation::validate_url;
use stampede_config::{ConfigLoader, StampedeConfig};
use stampede_core::{LoadTestConfig, LoadTestResult};
use stampede_engine::{LoadTestOrchestrator, UserContext};
use stampede_storage::{InMemoryResultRepository, ResultRepository};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands, OutputFormat};

fn init_tracing(config: &StampedeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_filter_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_plan(path: &Path) -> Result<LoadTestConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let plan: LoadTestConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse plan file {}", path.display()))?;

    plan.validate()
        .with_context(|| format!("Invalid plan file {}", path.display()))?;
    validate_url(&plan.target_url, "target_url", "plan")
        .with_context(|| format!("Invalid plan file {}", path.display()))?;
    Ok(plan)
}

fn print_summary(record: &LoadTestResult) {
    println!("Test:     {} ({})", record.config.test_name, record.id);
    println!("Status:   {}", record.status);
    if let Some(error) = &record.error {
        println!("Error:    {}", error);
    }
    if let Some(summary) = &record.summary {
        println!(
            "Requests: {} total, {} ok, {} failed ({:.1}% errors)",
            summary.total_requests,
            summary.successful_requests,
            summary.failed_requests,
            summary.error_rate * 100.0
        );
        println!(
            "Latency:  avg {:.1}ms  p50 {:.1}ms  p95 {:.1}ms  p99 {:.1}ms",
            summary.avg_response_time_ms,
            summary.p50_response_time_ms,
            summary.p95_response_time_ms,
            summary.p99_response_time_ms
        );
        println!("Rate:     {:.1} req/s", summary.throughput_rps);
    }
    if let Some(score) = record.performance_score {
        println!("Score:    {:.0}/100", score);
    }
    for recommendation in &record.recommendations {
        println!("  - {}", recommendation);
    }
}


#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::new();
    let config = loader
        .load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&config);

    match cli.command {
        Commands::Run {
            plan,
            auth_token,
            output,
        } => {
            let plan = load_plan(&plan)?;
            info!("Running plan '{}' against {}", plan.test_name, plan.target_url);

            let repository = Arc::new(InMemoryResultRepository::new());
            let orchestrator = LoadTestOrchestrator::new(
                config.engine.clone(),
                config.http.clone(),
                repository.clone(),
            );

            let ctx = UserContext { auth_token };
            let test_id = orchestrator
                .run_load_test_as(plan, ctx, None)
                .await
                .context("Load test run failed to start")?;

            let record = repository
                .find_by_id(test_id)
                .await
                .context("Failed to fetch stored result")?
                .context("Stored result disappeared")?;

            match output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&record)?)
                }
                OutputFormat::Summary => print_summary(&record),
            }
        }
        Commands::Validate { plan } => {
            let plan = load_plan(&plan)?;
            config.validate_all().context("Invalid engine configuration")?;
            println!(
                "Plan '{}' is valid: {} users for {}s against {}",
                plan.test_name, plan.max_users, plan.duration_seconds, plan.target_url
            );
        }
    }

    Ok(())
}
