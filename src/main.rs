use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use status_core::{
    config::EngineConfig, error::EngineError, setup_logger, sim::Scenario,
    status::EffectDatabase,
};

const OVERRIDES_FILE: &str = "data/effect_overrides.ron";

// main
#[derive(Parser)]
#[command(
    name = "status-sim",                      // 프로그램 이름
    author = env!("CARGO_PKG_AUTHORS"),       // 작성자
    version = env!("CARGO_PKG_VERSION"),      // 버전
    about = env!("CARGO_PKG_DESCRIPTION"),    // 짧은 설명
    long_about = None,                        // 긴 설명 (None은 미사용)
)]
struct Args {
    /// 실행할 시나리오 (.ron)
    #[arg(long)]
    #[arg(required = true)]
    scenario: PathBuf,

    /// 시나리오 파일의 seed 대신 사용할 값
    #[arg(long)]
    seed: Option<u64>,

    /// 마지막 명령 이후 더 진행할 시간(ms)
    #[arg(long, default_value_t = 600_000)]
    settle_ms: u64,

    #[arg(long)]
    pretty: bool,
}

fn load_database() -> Result<EffectDatabase, EngineError> {
    let mut db = EffectDatabase::builtin();
    match std::fs::read_to_string(OVERRIDES_FILE) {
        Ok(content) => {
            let applied = db.apply_overrides_ron(&content)?;
            tracing::info!("{} descriptor overrides applied from {}", applied, OVERRIDES_FILE);
        }
        Err(e) => tracing::info!("no descriptor overrides ({}): {}", OVERRIDES_FILE, e),
    }
    Ok(db)
}

fn run(args: &Args) -> Result<String, EngineError> {
    let scenario = Scenario::load(&args.scenario)?;
    let config = Arc::new(EngineConfig::global().clone());
    let db = Arc::new(load_database()?);

    let recorder = scenario.run(config, db, args.seed, args.settle_ms)?;
    let json = if args.pretty {
        recorder.to_pretty_json_string()?
    } else {
        recorder.to_json_string()?
    };
    Ok(json)
}

fn main() {
    let args = Args::parse();
    setup_logger();

    match run(&args) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("scenario failed: {}", e);
            eprintln!("status-sim: {}", e);
            std::process::exit(1);
        }
    }
}
