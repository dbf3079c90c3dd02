use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info, Level};

use rust_laboon::{
    config::Config,
    error::{LaboonError, Result},
    Difficulty, ProofOfWork, Session,
};

/// Toy proof-of-work ledger: every line you type is mined into a block.
#[derive(Parser, Debug)]
#[command(name = "rust-laboon", version, about)]
struct Args {
    /// Leading zero hex digits a block hash needs (0-8). Invalid values
    /// fall back to the configured difficulty.
    #[arg(allow_hyphen_values = true)]
    difficulty: Option<String>,

    /// Anything after the difficulty is ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    ignored: Vec<String>,

    /// Config file (defaults to $LABOON_CONFIG, then ./laboon.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search nonces on all cores
    #[arg(long)]
    parallel: bool,

    /// Print every candidate tried while mining
    #[arg(long)]
    show_attempts: bool,

    /// trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let level = match &args.log_level {
        Some(level) => level
            .parse::<Level>()
            .map_err(|_| LaboonError::ConfigError(format!("无效的日志级别: {}", level)))?,
        None => config.log_level()?,
    };

    // 初始化日志记录器, 输出到 stderr 以免干扰交互界面
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .init();

    if !args.ignored.is_empty() {
        debug!("忽略多余参数: {:?}", args.ignored);
    }

    let (difficulty, fallback) = Difficulty::from_arg(args.difficulty.as_deref(), config.mining.difficulty);
    if let Some(reason) = fallback {
        println!("{}", reason);
    }
    if difficulty > Difficulty::DEFAULT {
        println!(
            "Difficulty {} needs about {} attempts per block and may never finish",
            difficulty,
            difficulty.expected_attempts()
        );
    }
    info!("使用难度: {}", difficulty);

    let pow = ProofOfWork::new(difficulty).with_parallel(args.parallel || config.mining.parallel);
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(stdin.lock(), stdout.lock(), pow)
        .show_attempts(args.show_attempts || config.mining.show_attempts)
        .run()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_arguments_are_ignored() {
        let args = Args::try_parse_from(["rust-laboon", "3", "extra", "more"]).unwrap();
        assert_eq!(args.difficulty.as_deref(), Some("3"));
        assert_eq!(args.ignored, ["extra", "more"]);
    }

    #[test]
    fn test_hyphen_difficulty_reaches_fallback() {
        let args = Args::try_parse_from(["rust-laboon", "-5", "x"]).unwrap();
        assert_eq!(args.difficulty.as_deref(), Some("-5"));

        let (level, reason) = Difficulty::from_arg(args.difficulty.as_deref(), Difficulty::DEFAULT);
        assert_eq!(level, Difficulty::DEFAULT);
        assert!(reason.is_some());
    }

    #[test]
    fn test_flags_before_difficulty() {
        let args = Args::try_parse_from(["rust-laboon", "--parallel", "2"]).unwrap();
        assert!(args.parallel);
        assert_eq!(args.difficulty.as_deref(), Some("2"));
        assert!(args.ignored.is_empty());
    }
}
