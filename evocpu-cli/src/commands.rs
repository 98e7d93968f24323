//! CLI command implementations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use evocpu_common::Genome;
use evocpu_vm::{Hardware, InstLib, TraceError};
use tracing::debug;

use crate::ExecArgs;

/// Extension that marks a binary genome.
const BINARY_EXT: &str = "gpb";

/// Execute a genome and print registers, outputs, error count and steps run.
pub fn run(path: &Path, exec: &ExecArgs) -> Result<(), i32> {
    let mut hw = load_cpu(path, exec)?;

    match hw.process(exec.steps) {
        Ok(steps) => {
            print_report(&hw, steps);
            Ok(())
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Print the state before every step.
pub fn trace(path: &Path, exec: &ExecArgs) -> Result<(), i32> {
    let mut hw = load_cpu(path, exec)?;

    let mut out = String::new();
    let result = hw.trace(exec.steps, &mut out);
    print!("{out}");
    match result {
        Ok(()) => Ok(()),
        Err(TraceError::Vm(e)) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
        Err(e @ TraceError::Write(_)) => {
            eprintln!("error: {e}");
            Err(1)
        }
    }
}

/// Print a genome indented by scope.
pub fn print(path: &Path) -> Result<(), i32> {
    let lib = InstLib::default_library();
    let genome = load_genome(path, lib.as_ref())?;
    print!("{}", evocpu_assembler::print_genome(&genome, lib.as_ref()));
    Ok(())
}

/// Assemble a listing to a binary genome.
pub fn assemble(input: &Path, output: Option<&Path>) -> Result<(), i32> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));

    let lib = InstLib::default_library();
    let text = read_text(input)?;
    let genome = evocpu_assembler::assemble(&text, lib.as_ref()).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let bytes = genome.encode();
    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{}': {e}", output.display());
        1
    })?;

    eprintln!(
        "assembled {} instructions ({} bytes) -> {}",
        genome.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}

/// Disassemble a binary genome to a flat listing.
pub fn disassemble(input: &Path) -> Result<(), i32> {
    let lib = InstLib::default_library();
    let genome = read_binary(input)?;
    print!("{}", evocpu_assembler::disassemble(&genome, lib.as_ref()));
    Ok(())
}

/// List every entry of the default instruction set.
pub fn list() -> Result<(), i32> {
    let lib = InstLib::default_library();
    let width = lib.defs().iter().map(|d| d.name.len()).max().unwrap_or(0);
    for def in lib.defs() {
        println!("{:<width$}  {}  {}", def.name, def.num_args, def.desc);
    }
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension(BINARY_EXT)
}

fn is_binary(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == BINARY_EXT)
}

/// Load a genome, as binary or as a listing depending on the extension.
fn load_genome(path: &Path, lib: &InstLib) -> Result<Genome, i32> {
    let genome = if is_binary(path) {
        read_binary(path)?
    } else {
        let text = read_text(path)?;
        evocpu_assembler::assemble(&text, lib).map_err(|e| {
            eprintln!("error: {e}");
            1
        })?
    };
    debug!(path = %path.display(), instructions = genome.len(), "loaded genome");
    Ok(genome)
}

fn load_cpu(path: &Path, exec: &ExecArgs) -> Result<Hardware, i32> {
    let lib: Arc<InstLib> = InstLib::default_library();
    let genome = load_genome(path, lib.as_ref())?;
    let mut hw = Hardware::with_genome(lib, genome);
    for &(id, value) in &exec.inputs {
        hw.set_input(id, value);
    }
    Ok(hw)
}

fn read_text(path: &Path) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        1
    })
}

fn read_binary(path: &Path) -> Result<Genome, i32> {
    let bytes = fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        1
    })?;

    Genome::decode(&bytes).map_err(|e| {
        eprintln!("error: invalid binary: {e}");
        1
    })
}

fn print_report(hw: &Hardware, steps: usize) {
    println!("steps: {steps}");
    let regs: Vec<String> = hw.regs().iter().map(f64::to_string).collect();
    println!("regs: {}", regs.join(" "));
    let outputs: Vec<String> = hw
        .outputs()
        .iter()
        .map(|(id, value)| format!("{id}={value}"))
        .collect();
    println!("outputs: {}", outputs.join(" "));
    println!("errors: {}", hw.num_errors());
    println!("halted: {}", hw.is_halted());
}
