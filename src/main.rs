use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use imgverify::application::dto::VerifyOptions;
use imgverify::application::VerifySuiteUseCase;
use imgverify::domain::services::DigestAlgorithm;
use imgverify::infrastructure::expectations::load_table;
use imgverify::infrastructure::fixture_store::LocalFixtureStore;
use imgverify::infrastructure::plugins::builtin_registry;
use imgverify::logging::{init_logging_with_format, LogFormat};

#[derive(Parser)]
#[command(name = "imgverify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify disk image decoders against golden fixture tables")]
struct Cli {
    /// Expectation table (JSON)
    #[arg(short, long)]
    table: PathBuf,

    /// Directory holding one sub-folder per suite
    #[arg(short = 'r', long, default_value = "test-files")]
    fixtures_root: PathBuf,

    /// Bytes hashed per step, in KiB
    #[arg(long, default_value_t = 1024)]
    chunk_size_kib: usize,

    /// Worker threads for parallel suites (defaults to available cores)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Verify fixtures one at a time
    #[arg(long)]
    sequential: bool,

    /// Read and hash on the same thread
    #[arg(long)]
    no_pipeline: bool,

    /// Digest algorithm (crc32, md5, sha256, sha512) instead of inferring it
    /// from each expected digest
    #[arg(long)]
    digest: Option<DigestAlgorithm>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn options(&self) -> VerifyOptions {
        let mut options =
            VerifyOptions::default().with_chunk_size(self.chunk_size_kib.saturating_mul(1024));
        if let Some(threads) = self.threads {
            options = options.with_threads(threads);
        }
        if let Some(algorithm) = self.digest {
            options = options.with_digest_algorithm(algorithm);
        }
        if self.sequential {
            options = options.sequential();
        }
        if self.no_pipeline {
            options = options.unpipelined();
        }
        options
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging_with_format(cli.log_format);

    let suites = load_table(&cli.table)
        .with_context(|| format!("Failed to load {}", cli.table.display()))?;

    let runner = VerifySuiteUseCase::new(
        Arc::new(LocalFixtureStore::new(&cli.fixtures_root)),
        Arc::new(builtin_registry()),
        cli.options(),
    );
    let report = runner.run(&suites).context("Verification run aborted")?;

    print!("{}", report.summary());

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
