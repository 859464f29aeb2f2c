//! `BuildConfig`: target arch/os, compressor choice, buildroot
//! override, and interpreter selection (SPEC_FULL.md §0 "Configuration").

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compressor {
    Gzip,
    Bzip2,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::Gzip
    }
}

/// Orchestrator-wide configuration, loaded by the CLI layer from
/// `--target`/`--buildroot`/`--config FILE` and overlaid on top of the
/// Spec's own macro-derived defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub target_arch: String,
    pub target_os: String,
    pub build_root: PathBuf,
    pub build_dir: PathBuf,
    pub source_dir: PathBuf,
    pub doc_dir: PathBuf,
    pub opt_flags: String,
    pub compressor: Compressor,
    pub interpreter: PathBuf,
    pub nodeps: bool,
    pub nocheck: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target_arch: std::env::consts::ARCH.to_string(),
            target_os: std::env::consts::OS.to_string(),
            build_root: PathBuf::from("/var/tmp/rpmkit-buildroot"),
            build_dir: PathBuf::from("/var/tmp/rpmkit-build"),
            source_dir: PathBuf::from("/usr/src/rpmkit/SOURCES"),
            doc_dir: PathBuf::from("/usr/share/doc"),
            opt_flags: "-O2 -g".to_string(),
            compressor: Compressor::default(),
            interpreter: PathBuf::from("/bin/sh"),
            nodeps: false,
            nocheck: false,
        }
    }
}

impl BuildConfig {
    /// Parses a `BuildConfig` overlay from TOML text (the `--config
    /// FILE` front-end flag), merging only the fields present onto
    /// defaults.
    pub fn merge_toml(mut self, text: &str) -> Result<Self, toml::de::Error> {
        #[derive(Deserialize, Default)]
        struct Overlay {
            target_arch: Option<String>,
            target_os: Option<String>,
            build_root: Option<PathBuf>,
            build_dir: Option<PathBuf>,
            source_dir: Option<PathBuf>,
            doc_dir: Option<PathBuf>,
            opt_flags: Option<String>,
            compressor: Option<Compressor>,
            interpreter: Option<PathBuf>,
            nodeps: Option<bool>,
            nocheck: Option<bool>,
        }
        let overlay: Overlay = toml::from_str(text)?;
        if let Some(v) = overlay.target_arch {
            self.target_arch = v;
        }
        if let Some(v) = overlay.target_os {
            self.target_os = v;
        }
        if let Some(v) = overlay.build_root {
            self.build_root = v;
        }
        if let Some(v) = overlay.build_dir {
            self.build_dir = v;
        }
        if let Some(v) = overlay.source_dir {
            self.source_dir = v;
        }
        if let Some(v) = overlay.doc_dir {
            self.doc_dir = v;
        }
        if let Some(v) = overlay.opt_flags {
            self.opt_flags = v;
        }
        if let Some(v) = overlay.compressor {
            self.compressor = v;
        }
        if let Some(v) = overlay.interpreter {
            self.interpreter = v;
        }
        if let Some(v) = overlay.nodeps {
            self.nodeps = v;
        }
        if let Some(v) = overlay.nocheck {
            self.nocheck = v;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_host_platform() {
        let cfg = BuildConfig::default();
        assert_eq!(cfg.target_arch, std::env::consts::ARCH);
        assert!(matches!(cfg.compressor, Compressor::Gzip));
    }

    #[test]
    fn merge_toml_overlays_only_present_fields() {
        let cfg = BuildConfig::default().merge_toml("target_arch = \"aarch64\"\n").unwrap();
        assert_eq!(cfg.target_arch, "aarch64");
        assert_eq!(cfg.target_os, std::env::consts::OS);
    }

    #[test]
    fn merge_toml_accepts_compressor_choice() {
        let cfg = BuildConfig::default().merge_toml("compressor = \"bzip2\"\n").unwrap();
        assert!(matches!(cfg.compressor, Compressor::Bzip2));
    }
}
