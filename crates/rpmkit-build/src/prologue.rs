//! Stage script prologue generation (spec.md §4.E step 1 / §6 "Environment
//! variables consumed").

use rpmkit_strbuf::StringBuf;

use crate::config::BuildConfig;

/// Standard environment the prologue exports before handing control to
/// the stage's own script body.
pub struct PrologueContext<'a> {
    pub config: &'a BuildConfig,
    pub build_subdir: &'a str,
    pub package_name: &'a str,
    pub package_version: &'a str,
    pub package_release: &'a str,
}

/// Builds the full script (prologue + body) a stage's interpreter
/// will run: `set -e`, exported `RPM_*` variables, a `cd` into the
/// build subdirectory, then the stage's own body verbatim.
pub fn build_script(ctx: &PrologueContext<'_>, body: &str) -> StringBuf {
    let mut script = StringBuf::new();
    script.append_line(b"set -e");
    export(&mut script, "RPM_BUILD_ROOT", &ctx.config.build_root.display().to_string());
    export(&mut script, "RPM_BUILD_DIR", &ctx.config.build_dir.display().to_string());
    export(&mut script, "RPM_SOURCE_DIR", &ctx.config.source_dir.display().to_string());
    export(&mut script, "RPM_OPT_FLAGS", &ctx.config.opt_flags);
    export(&mut script, "RPM_ARCH", &ctx.config.target_arch);
    export(&mut script, "RPM_OS", &ctx.config.target_os);
    export(&mut script, "RPM_DOC_DIR", &ctx.config.doc_dir.display().to_string());
    export(&mut script, "RPM_PACKAGE_NAME", ctx.package_name);
    export(&mut script, "RPM_PACKAGE_VERSION", ctx.package_version);
    export(&mut script, "RPM_PACKAGE_RELEASE", ctx.package_release);
    script.append_line(format!("cd \"{}/{}\"", ctx.config.build_dir.display(), ctx.build_subdir).as_bytes());
    script.append(body.as_bytes());
    script.append_line(b"");
    script
}

fn export(script: &mut StringBuf, name: &str, value: &str) {
    script.append_line(format!("export {name}=\"{value}\"").as_bytes());
}
