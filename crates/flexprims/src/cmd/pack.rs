use flexprims_layout::Limits;
use flexprims_record::RawRecord;
use serde::Serialize;

use crate::cmd::{read_input, write_output, PackArgs};
use crate::exit::{flex_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct PackReport {
    schema_id: &'static str,
    output: String,
    shape: String,
    count: usize,
    block_bytes: usize,
}

impl Report for PackReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("output", self.output.clone()),
            ("shape", self.shape.clone()),
            ("count", self.count.to_string()),
            ("block_bytes", self.block_bytes.to_string()),
        ]
    }
}

pub fn run(args: PackArgs, format: OutputFormat, limits: &Limits) -> CliResult<i32> {
    let shape = args.shape.shape()?;
    let elements = read_input(&args.path, limits)?;
    let record = RawRecord::from_bytes_with(shape, &elements, args.count, limits)
        .map_err(|err| flex_error("pack failed", err))?;
    tracing::debug!(
        count = record.count(),
        bytes = record.as_bytes().len(),
        "packed record"
    );

    write_output(args.output.as_deref(), record.as_bytes())?;
    if let Some(path) = &args.output {
        let out = PackReport {
            schema_id: "https://schemas.3leaps.dev/flexprims/cli/v1/pack-result.schema.json",
            output: path.display().to_string(),
            shape: shape.to_string(),
            count: record.count(),
            block_bytes: record.as_bytes().len(),
        };
        print_report(&out, format);
    }
    Ok(SUCCESS)
}
