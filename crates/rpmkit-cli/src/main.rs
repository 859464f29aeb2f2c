//! `rpmkit`: the command-line front end for the build orchestrator
//! (spec.md §6). Parses a spec file, builds a stage plan from the
//! requested legacy build mode, and runs it.

mod cli;
mod mode;

use std::process::ExitCode;

use clap::Parser;

use cli::{preprocess_legacy_flags, Cli};
use rpmkit_build::{BuildConfig, LogEntry, LogLevel, NullDependencyExtractor, Outcome, StructuredLog};
use rpmkit_sign::{AsymmetricAlgorithm, NullAsymmetricSigner, Signer};
use rpmkit_macro::MacroContext;

fn main() -> ExitCode {
    let args = preprocess_legacy_flags(std::env::args().collect());
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Usage(msg)) => {
            eprintln!("rpmkit: {msg}");
            ExitCode::from(2)
        }
        Err(Failure::Build(msg)) => {
            eprintln!("rpmkit: {msg}");
            ExitCode::from(1)
        }
    }
}

enum Failure {
    Usage(String),
    Build(String),
}

fn run(cli: Cli) -> Result<(), Failure> {
    let mut config = BuildConfig::default();
    if let Some(target) = &cli.target {
        let (arch, os) = target.split_once('-').ok_or_else(|| {
            Failure::Usage(format!("--target {target:?} must be of the form arch-os"))
        })?;
        config.target_arch = arch.to_string();
        config.target_os = os.to_string();
    }
    if let Some(buildroot) = &cli.buildroot {
        config.build_root = buildroot.clone();
    }
    config.nodeps = cli.nodeps;
    config.nocheck = cli.nocheck;

    if let Some(config_path) = &cli.config {
        let text = std::fs::read_to_string(config_path)
            .map_err(|e| Failure::Usage(format!("cannot read {}: {e}", config_path.display())))?;
        config = config.merge_toml(&text).map_err(|e| Failure::Usage(format!("bad --config file: {e}")))?;
    }

    let mut spec = rpmkit_spec::parse(&cli.spec_path, MacroContext::new(), &config.target_arch, &config.target_os)
        .map_err(|e| Failure::Usage(e.to_string()))?;

    let mut plan = cli.mode.plan();
    if cli.short_circuit {
        plan = plan.short_circuit_from(cli.mode.short_circuit_floor());
    }

    let extractor = NullDependencyExtractor;
    let signer: Option<NullAsymmetricSigner> =
        cli.sign.then(|| NullAsymmetricSigner::new(AsymmetricAlgorithm::Gpg));
    let signer_ref: Option<&dyn Signer> = signer.as_ref().map(|s| s as &dyn Signer);

    let mut log = if cli.quiet {
        StructuredLog::to_buffer()
    } else if cli.verbose {
        StructuredLog::to_file(std::path::Path::new("/dev/stderr"))
            .map_err(|e| Failure::Usage(format!("cannot open stderr for logging: {e}")))?
    } else {
        StructuredLog::to_buffer()
    };

    let start_entry = LogEntry::new(LogLevel::Info, "run_start");
    let _ = log.emit(&start_entry);

    let result = rpmkit_build::run(&mut spec, plan, &config, &extractor, signer_ref, &mut log, &cli.out_dir);
    let _ = log.flush();

    match result {
        Ok(written) => {
            if !cli.quiet {
                for path in &written {
                    println!("{}", path.display());
                }
            }
            Ok(())
        }
        Err(err) => {
            let _ = log.emit(&LogEntry::new(LogLevel::Error, "run_failed").with_outcome(Outcome::Fail).with_details(err.to_string()));
            let _ = log.flush();
            Err(Failure::Build(err.to_string()))
        }
    }
}
