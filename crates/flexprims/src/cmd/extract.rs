use flexprims_layout::Limits;
use flexprims_record::RawRecord;
use serde::Serialize;

use crate::cmd::{read_input, write_output, ExtractArgs};
use crate::exit::{flex_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct ExtractReport {
    schema_id: &'static str,
    output: String,
    count: usize,
    bytes_written: u64,
}

impl Report for ExtractReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("output", self.output.clone()),
            ("count", self.count.to_string()),
            ("bytes_written", self.bytes_written.to_string()),
        ]
    }
}

pub fn run(args: ExtractArgs, format: OutputFormat, limits: &Limits) -> CliResult<i32> {
    let shape = args.shape.shape()?;
    let block = read_input(&args.path, limits)?;
    let record = RawRecord::from_block(shape, block)
        .map_err(|err| flex_error(&format!("invalid record {}", args.path.display()), err))?;

    let mut elements = vec![0u8; record.elements().len()];
    let written: u64 = record
        .write_elements_with(&mut elements, limits)
        .map_err(|err| flex_error("extract failed", err))?;
    tracing::debug!(count = record.count(), bytes = written, "extracted elements");

    write_output(args.output.as_deref(), &elements)?;
    if let Some(path) = &args.output {
        let out = ExtractReport {
            schema_id: "https://schemas.3leaps.dev/flexprims/cli/v1/extract-result.schema.json",
            output: path.display().to_string(),
            count: record.count(),
            bytes_written: written,
        };
        print_report(&out, format);
    }
    Ok(SUCCESS)
}
