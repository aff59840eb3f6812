use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use glaze_dxbc::{DxbcContainer, DxbcStage};
use glaze_reflect::{BufferKind, ProgramReflection, ShaderStage, StageSet};

fn usage() -> &'static str {
    "\
reflect_dump: consolidate and dump the reflection tables of a multi-stage program

USAGE:
    cargo run -p glaze-dxbc --bin reflect_dump -- <stage>:<path.dxbc> [...]

STAGES:
    vs, hs, ds, gs, ps, cs

EXAMPLE:
    reflect_dump vs:shader.vs.dxbc ps:shader.ps.dxbc
"
}

fn main() {
    if let Err(err) = real_main() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn stage_from_tag(tag: &str) -> Option<ShaderStage> {
    match tag {
        "vs" => Some(ShaderStage::Vertex),
        "hs" => Some(ShaderStage::Hull),
        "ds" => Some(ShaderStage::Domain),
        "gs" => Some(ShaderStage::Geometry),
        "ps" => Some(ShaderStage::Pixel),
        "cs" => Some(ShaderStage::Compute),
        _ => None,
    }
}

fn real_main() -> anyhow::Result<()> {
    let mut inputs: Vec<(ShaderStage, PathBuf)> = Vec::new();

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{}", usage());
                return Ok(());
            }
            _ => {
                let Some((tag, path)) = arg.split_once(':') else {
                    bail!("expected <stage>:<path>, got {arg:?}\n\n{}", usage());
                };
                let Some(stage) = stage_from_tag(tag) else {
                    bail!("unknown stage tag {tag:?}\n\n{}", usage());
                };
                inputs.push((stage, PathBuf::from(path)));
            }
        }
    }

    if inputs.is_empty() {
        bail!("no input blobs\n\n{}", usage());
    }

    let mut stages: Vec<(ShaderStage, DxbcStage)> = Vec::new();
    for (stage, path) in &inputs {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let container = DxbcContainer::parse(&bytes)
            .with_context(|| format!("failed to parse {} as DXBC", path.display()))?;

        println!("{:?} <- {}", stage, path.display());
        for (index, chunk) in container.chunks().enumerate() {
            println!("  [{index:02}] {} {} bytes", chunk.fourcc, chunk.data.len());
        }

        let parsed = DxbcStage::from_container(&container)
            .with_context(|| format!("failed to reflect {}", path.display()))?;
        stages.push((*stage, parsed));
    }

    let mut set = StageSet::new();
    for (stage, parsed) in &stages {
        set.set(*stage, parsed);
    }

    let program = match ProgramReflection::reflect(&set) {
        Ok(program) => program,
        Err(err) => {
            bail!("consolidation rejected the program:\n{err}");
        }
    };

    for kind in [BufferKind::Constant, BufferKind::UnorderedAccess] {
        if program.buffer_count(kind) == 0 {
            continue;
        }
        println!();
        println!("{kind:?} buffers:");
        for buffer in program.buffers(kind) {
            println!(
                "  [b{}] {} ({} bytes, {} variables, stages {:?})",
                buffer.bind_point(),
                buffer.name(),
                buffer.size_in_bytes(),
                buffer.variable_count(),
                buffer.stage_mask()
            );
            for (name, var) in buffer.variables() {
                let array = if var.array_size > 0 {
                    format!("[{}] stride {}", var.array_size, var.array_stride)
                } else {
                    String::new()
                };
                println!(
                    "      +{:<4} {:?}{} {}",
                    var.location, var.ty, array, name
                );
            }
        }
    }

    if program.resource_count() > 0 {
        println!();
        println!("resources:");
        for resource in program.resources() {
            println!(
                "  [t{}/space{}] {} {:?} {:?} {:?} (stages {:?})",
                resource.bind_point,
                resource.register_space,
                resource.name,
                resource.kind,
                resource.dims,
                resource.return_type,
                resource.stage_mask
            );
        }
    }

    Ok(())
}
