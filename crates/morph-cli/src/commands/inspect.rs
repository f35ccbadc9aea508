//! `morph inspect`: print a module's header and disassembly.

use crate::output::StyledOutput;
use anyhow::Context;
use morph_engine::bytecode::disassemble;
use morph_engine::Module;
use std::path::Path;
use termcolor::ColorChoice;

pub fn execute(path: &Path, color: ColorChoice) -> anyhow::Result<()> {
    let module = Module::from_file(path)
        .with_context(|| format!("Failed to load module {}", path.display()))?;

    let mut out = StyledOutput::new(color);
    out.heading(&path.display().to_string());
    out.field("version", &module.header.version.to_string());
    out.field("flags", &format!("{:#04x}", module.header.flags));
    out.field("timestamp", &module.header.timestamp.to_string());
    out.field("root", module.name());
    out.plain("");

    for line in disassemble(&module.code).lines() {
        out.plain(line);
    }
    out.flush();
    Ok(())
}
