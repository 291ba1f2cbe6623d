//! 健康数据录入程序

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vitals_core::{RawInput, RawNumber, TimestampChoice, VitalsError};
use vitals_database::{DatabasePool, DatabaseQueries, PgRecordStore, StoreConfig};
use vitals_workflow::{HealthDataWorkflow, RecordView};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "vitals-entry")]
#[command(about = "健康检查数据录入、浏览与查询")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 创建数据表和索引
    Init,
    /// 录入一条记录
    Submit(SubmitArgs),
    /// 列出全部记录及汇总
    List,
    /// 按记录ID或患者ID查询
    Search {
        /// 记录ID
        #[arg(long, conflicts_with = "patient_id", required_unless_present = "patient_id")]
        id: Option<i64>,
        /// 患者ID
        #[arg(long)]
        patient_id: Option<i64>,
    },
}

#[derive(ClapArgs, Debug)]
struct SubmitArgs {
    #[arg(long)]
    patient_id: f64,
    #[arg(long, default_value_t = 120.0)]
    systolic: f64,
    #[arg(long, default_value_t = 80.0)]
    diastolic: f64,
    #[arg(long, default_value_t = 98.6)]
    temperature_f: f64,
    #[arg(long, default_value_t = 70.0)]
    weight_kg: f64,
    #[arg(long, default_value_t = 170.0)]
    height_cm: f64,
    #[arg(long, default_value_t = 25.0)]
    mmse_score: f64,
    /// RFC 3339 时间，缺省为当前时间
    #[arg(long)]
    created_at: Option<DateTime<Utc>>,
}

impl From<SubmitArgs> for RawInput {
    fn from(args: SubmitArgs) -> Self {
        RawInput {
            patient_id: RawNumber::Float(args.patient_id),
            systolic: RawNumber::Float(args.systolic),
            diastolic: RawNumber::Float(args.diastolic),
            temperature_f: RawNumber::Float(args.temperature_f),
            weight_kg: RawNumber::Float(args.weight_kg),
            height_cm: RawNumber::Float(args.height_cm),
            mmse_score: RawNumber::Float(args.mmse_score),
            created_at: args
                .created_at
                .map_or(TimestampChoice::Now, TimestampChoice::At),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .init();

    // 配置缺失时在任何存储操作之前退出
    let store_config = StoreConfig::load(args.config.as_deref())
        .context("failed to load store configuration")?;

    let pool = DatabasePool::connect(&store_config)
        .await
        .context("failed to connect to the record store")?;

    let outcome = run(args.command, &pool, &store_config).await;
    pool.close().await;

    if let Err(e) = &outcome {
        if e.is_user_correctable() {
            error!("输入无效: {}", e);
        } else {
            error!("后端错误: {}", e);
        }
    }
    outcome.map_err(anyhow::Error::from)
}

async fn run(command: Command, pool: &DatabasePool, config: &StoreConfig) -> Result<(), VitalsError> {
    if let Command::Init = command {
        DatabaseQueries::new(pool)
            .create_tables(config.enforce_unique_patient_id)
            .await?;
        info!("Schema ready");
        return Ok(());
    }

    let workflow = HealthDataWorkflow::new(Arc::new(PgRecordStore::new(pool.clone())));

    match command {
        Command::Init => {}
        Command::Submit(submit) => {
            let receipt = workflow.submit_record(&RawInput::from(submit)).await?;
            print_json(&receipt.view);
        }
        Command::List => {
            let listing = workflow.refresh_list().await?;
            print_json(&listing.views());
            println!("Total Records: {}", listing.total_records);
            if let Some(avg) = listing.average_mmse_display() {
                println!("Average MMSE Score: {}", avg);
            }
        }
        Command::Search { id: Some(id), .. } => match workflow.search_by_id(id).await? {
            Some(found) => print_json(&RecordView::from(&found)),
            None => println!("No record found with ID: {}", id),
        },
        Command::Search { patient_id, .. } => {
            let patient_id = patient_id.unwrap_or_default();
            let found = workflow.search_by_patient(patient_id).await?;
            if found.is_empty() {
                println!("No record found for patient ID: {}", patient_id);
            } else {
                let views: Vec<_> = found.iter().map(RecordView::from).collect();
                print_json(&views);
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to render output: {}", e),
    }
}
