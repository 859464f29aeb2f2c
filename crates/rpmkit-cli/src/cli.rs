//! Argument surface (spec.md §6). The historical `-bp`/`-bc`/`-bi`/
//! `-bl`/`-ba`/`-bb`/`-bs` single-token flags aren't expressible as
//! ordinary clap long/short options, so [`preprocess_legacy_flags`]
//! rewrites the first one it finds into `--mode <value>` before
//! [`Cli::parse`] ever sees the argument vector.

use std::path::PathBuf;

use clap::Parser;

use crate::mode::BuildMode;

#[derive(Debug, Parser)]
#[command(name = "rpmkit", about = "Builds packages from a spec file")]
pub struct Cli {
    /// Build mode (legacy flags -bp/-bc/-bi/-bl/-ba/-bb/-bs are
    /// rewritten to this before parsing).
    #[arg(long)]
    pub mode: BuildMode,

    /// Path to the `.spec` file to build.
    pub spec_path: PathBuf,

    /// Skip stages strictly before the mode's own stage.
    #[arg(long = "short-circuit")]
    pub short_circuit: bool,

    /// Override the build root directory.
    #[arg(long)]
    pub buildroot: Option<PathBuf>,

    /// Target platform, as `arch-os` (e.g. `x86_64-linux`).
    #[arg(long)]
    pub target: Option<String>,

    /// Skip automatic dependency extraction.
    #[arg(long)]
    pub nodeps: bool,

    /// Skip the `%check` stage even if selected.
    #[arg(long)]
    pub nocheck: bool,

    /// Request an asymmetric signature on any package written.
    #[arg(long)]
    pub sign: bool,

    /// Suppress stage-completion logging.
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit per-stage JSONL logging to stderr instead of a log file.
    #[arg(short, long)]
    pub verbose: bool,

    /// TOML file overlaid onto the default `BuildConfig`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory packages are written into.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// Rewrites the first legacy build-mode token (`-bp`, `-bc`, ...) found
/// in `args` into `--mode <value>`, leaving everything else untouched.
pub fn preprocess_legacy_flags(args: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len() + 1);
    let mut rewritten = false;
    for arg in args {
        if !rewritten {
            if let Some(mode) = BuildMode::from_legacy_flag(&arg) {
                out.push("--mode".to_string());
                out.push(mode_value_name(mode).to_string());
                rewritten = true;
                continue;
            }
        }
        out.push(arg);
    }
    out
}

fn mode_value_name(mode: BuildMode) -> &'static str {
    match mode {
        BuildMode::Prep => "prep",
        BuildMode::Compile => "compile",
        BuildMode::Install => "install",
        BuildMode::List => "list",
        BuildMode::All => "all",
        BuildMode::Binary => "binary",
        BuildMode::Source => "source",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_a_legacy_flag_to_mode() {
        let args = vec!["rpmkit".to_string(), "-bi".to_string(), "hello.spec".to_string()];
        let rewritten = preprocess_legacy_flags(args);
        assert_eq!(rewritten, vec!["rpmkit", "--mode", "install", "hello.spec"]);
    }

    #[test]
    fn leaves_args_without_a_legacy_flag_untouched() {
        let args = vec!["rpmkit".to_string(), "--mode".to_string(), "all".to_string()];
        assert_eq!(preprocess_legacy_flags(args.clone()), args);
    }

    #[test]
    fn only_rewrites_the_first_occurrence() {
        let args = vec!["rpmkit".to_string(), "-bi".to_string(), "-bs".to_string()];
        let rewritten = preprocess_legacy_flags(args);
        assert_eq!(rewritten, vec!["rpmkit", "--mode", "install", "-bs"]);
    }
}
