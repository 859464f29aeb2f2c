//! The data model a parsed spec file populates (spec.md §3).

use std::collections::HashMap;

use rpmkit_header::Header;
use rpmkit_macro::MacroContext;
use rpmkit_strbuf::StringBuf;

/// A `Source:`/`Patch:`/`Icon:` preamble entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub full_url: String,
    pub basename: String,
    pub index: u32,
    pub flags: SourceFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceFlags(pub u8);

impl SourceFlags {
    pub const IS_SOURCE: Self = Self(0b0001);
    pub const IS_PATCH: Self = Self(0b0010);
    pub const IS_ICON: Self = Self(0b0100);
    pub const NO_INCLUDE_IN_PKG: Self = Self(0b1000);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for SourceFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    PreIn,
    PostIn,
    PreUn,
    PostUn,
    Verify,
}

/// A parsed `Requires:`/`Provides:`/`Conflicts:`/`Obsoletes:` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub name: String,
    pub op: Option<DependencyOp>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    In,
    Un,
    PostUn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerScript {
    Inline(String),
    File(String),
}

/// One `%trigger{in,un,postun}` entry, indexed so the package writer
/// can emit parallel `TriggerName`/`TriggerVersion`/`TriggerFlags`/
/// `TriggerIndex` arrays alongside `TriggerScripts` (spec.md §4.D).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEntry {
    pub index: u32,
    pub kind: TriggerKind,
    pub subject: DependencyEntry,
    pub prog: Option<String>,
    pub script: TriggerScript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub date: String,
    pub author: String,
    pub text: String,
}

/// One built artifact: the main package or a `%package` subpackage.
pub struct Package {
    pub name: String,
    pub header: Header,
    pub file_manifest: StringBuf,
    pub payload_plan: Option<PayloadPlan>,
    pub scripts: HashMap<ScriptKind, String>,
    pub trigger_entries: Vec<TriggerEntry>,
    pub auto_req_prov: bool,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: Header::new(),
            file_manifest: StringBuf::new(),
            payload_plan: None,
            scripts: HashMap::new(),
            trigger_entries: Vec::new(),
            auto_req_prov: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Prep,
    Build,
    Install,
    Check,
    Clean,
}

/// One file the payload writer will emit, resolved from a `%files`
/// glob against the build root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPlanEntry {
    pub src_path: String,
    pub archive_name: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub mtime: u32,
    pub size: u64,
    pub link_target: Option<String>,
    pub flags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadPlan {
    pub entries: Vec<PayloadPlanEntry>,
}

/// The fully parsed build recipe.
pub struct Spec {
    pub spec_path: String,
    pub source_rpm_name: Option<String>,
    pub build_root: Option<String>,
    pub build_subdir: Option<String>,
    pub sources: Vec<Source>,
    pub no_source: bool,
    pub source_header: Header,
    pub macros: MacroContext,
    pub stage_bodies: HashMap<Stage, StringBuf>,
    pub packages: Vec<Package>,
    pub cookie: Option<String>,
    pub passphrase: Option<String>,
    pub source_payload_plan: Option<PayloadPlan>,
    pub changelog: Vec<ChangelogEntry>,
}

impl Spec {
    pub fn new(spec_path: impl Into<String>, macros: MacroContext) -> Self {
        Self {
            spec_path: spec_path.into(),
            source_rpm_name: None,
            build_root: None,
            build_subdir: None,
            sources: Vec::new(),
            no_source: false,
            source_header: Header::new(),
            macros,
            stage_bodies: HashMap::new(),
            packages: vec![Package::new("main")],
            cookie: None,
            passphrase: None,
            source_payload_plan: None,
            changelog: Vec::new(),
        }
    }

    pub fn main_package(&mut self) -> &mut Package {
        &mut self.packages[0]
    }

    pub fn package_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.iter_mut().find(|p| p.name == name)
    }
}
