use flexprims_layout::Limits;
use flexprims_record::RawRecord;
use serde::Serialize;

use crate::cmd::{read_input, InspectArgs};
use crate::exit::{flex_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct InspectReport {
    schema_id: &'static str,
    path: String,
    shape: String,
    count: usize,
    capacity: usize,
    elements_bytes: usize,
    total_bytes: usize,
    block_bytes: usize,
}

impl Report for InspectReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("path", self.path.clone()),
            ("shape", self.shape.clone()),
            ("count", self.count.to_string()),
            ("capacity", self.capacity.to_string()),
            ("elements_bytes", self.elements_bytes.to_string()),
            ("total_bytes", self.total_bytes.to_string()),
            ("block_bytes", self.block_bytes.to_string()),
        ]
    }
}

pub fn run(args: InspectArgs, format: OutputFormat, limits: &Limits) -> CliResult<i32> {
    let shape = args.shape.shape()?;
    let block = read_input(&args.path, limits)?;
    let record = RawRecord::from_block(shape, block)
        .map_err(|err| flex_error(&format!("invalid record {}", args.path.display()), err))?;

    let context = "cannot size record";
    let out = InspectReport {
        schema_id: "https://schemas.3leaps.dev/flexprims/cli/v1/record-info.schema.json",
        path: args.path.display().to_string(),
        shape: shape.to_string(),
        count: record.count(),
        capacity: record.capacity(),
        elements_bytes: record
            .elements_bytes()
            .map_err(|err| flex_error(context, err))?,
        total_bytes: record.total_bytes().map_err(|err| flex_error(context, err))?,
        block_bytes: record.as_bytes().len(),
    };
    tracing::debug!(count = out.count, capacity = out.capacity, "inspected record");
    print_report(&out, format);
    Ok(SUCCESS)
}
