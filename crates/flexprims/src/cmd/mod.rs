use clap::{Args, Subcommand};
use flexprims_layout::{CountWidth, Limits, Shape};
use std::fs;
use std::path::{Path, PathBuf};

use crate::exit::{flex_error, io_error, CliResult};
use crate::output::{print_raw, OutputFormat};

pub mod extract;
pub mod inspect;
pub mod pack;
pub mod size;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute element and total byte sizes for a record shape.
    Size(SizeArgs),
    /// Report the count, capacity, and sizes of a record file.
    Inspect(InspectArgs),
    /// Write a record file's live elements as raw bytes.
    Extract(ExtractArgs),
    /// Build a record file from raw element bytes.
    Pack(PackArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, limits: &Limits) -> CliResult<i32> {
    match command {
        Command::Size(args) => size::run(args, format, limits),
        Command::Inspect(args) => inspect::run(args, format, limits),
        Command::Extract(args) => extract::run(args, format, limits),
        Command::Pack(args) => pack::run(args, format, limits),
        Command::Version(args) => version::run(args),
    }
}

/// Record layout: a header holding a native-endian count, then elements.
#[derive(Args, Debug, Clone)]
pub struct ShapeArgs {
    /// Byte offset of the count field within the header.
    #[arg(long, default_value_t = 0)]
    pub count_offset: usize,
    /// Width of the count field in bits (8, 16, 32, or 64).
    #[arg(long, default_value = "32", value_parser = parse_count_width)]
    pub count_width: CountWidth,
    /// Byte offset of the first element (the header size).
    #[arg(long, default_value_t = 4)]
    pub elements_offset: usize,
    /// Size of one element in bytes.
    #[arg(long)]
    pub element_size: usize,
    /// Alignment of one element in bytes.
    #[arg(long, default_value_t = 1)]
    pub element_align: usize,
}

impl ShapeArgs {
    pub fn shape(&self) -> CliResult<Shape> {
        Shape::new(
            self.count_offset,
            self.count_width,
            self.elements_offset,
            self.element_size,
            self.element_align,
        )
        .map_err(|err| flex_error("invalid shape", err))
    }
}

/// Read a whole input file, refusing files larger than the sanity ceiling.
pub fn read_input(path: &Path, limits: &Limits) -> CliResult<Vec<u8>> {
    let context = format!("failed reading {}", path.display());
    let len = fs::metadata(path).map_err(|err| io_error(&context, err))?.len();
    limits
        .check(usize::try_from(len).unwrap_or(usize::MAX))
        .map_err(|err| flex_error(&context, err))?;
    fs::read(path).map_err(|err| io_error(&context, err))
}

/// Write bytes to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&Path>, data: &[u8]) -> CliResult<()> {
    match output {
        Some(path) => fs::write(path, data)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err)),
        None => print_raw(data).map_err(|err| io_error("failed writing stdout", err)),
    }
}

fn parse_count_width(value: &str) -> Result<CountWidth, String> {
    let bits: u32 = value.parse().map_err(|err| format!("invalid bit width: {err}"))?;
    CountWidth::from_bits(bits).map_err(|err| err.to_string())
}

#[derive(Args, Debug)]
pub struct SizeArgs {
    #[command(flatten)]
    pub shape: ShapeArgs,
    /// Element count to size for.
    #[arg(long, allow_negative_numbers = true)]
    pub count: i64,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Record file to inspect.
    pub path: PathBuf,
    #[command(flatten)]
    pub shape: ShapeArgs,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Record file to read.
    pub path: PathBuf,
    #[command(flatten)]
    pub shape: ShapeArgs,
    /// Write element bytes to this file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// File of raw element bytes.
    pub path: PathBuf,
    #[command(flatten)]
    pub shape: ShapeArgs,
    /// Number of elements to read from the file.
    #[arg(long, allow_negative_numbers = true)]
    pub count: i64,
    /// Write the record to this file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
