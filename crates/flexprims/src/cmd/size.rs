use flexprims_layout::{ElementCount, Limits};
use serde::Serialize;

use crate::cmd::SizeArgs;
use crate::exit::{flex_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct SizeReport {
    schema_id: &'static str,
    shape: String,
    count: usize,
    max_count: usize,
    elements_bytes: usize,
    total_bytes: usize,
    within_ceiling: bool,
}

impl Report for SizeReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("shape", self.shape.clone()),
            ("count", self.count.to_string()),
            ("max_count", self.max_count.to_string()),
            ("elements_bytes", self.elements_bytes.to_string()),
            ("total_bytes", self.total_bytes.to_string()),
            ("within_ceiling", self.within_ceiling.to_string()),
        ]
    }
}

pub fn run(args: SizeArgs, format: OutputFormat, limits: &Limits) -> CliResult<i32> {
    let shape = args.shape.shape()?;
    let count = args
        .count
        .to_count()
        .map_err(|err| flex_error("invalid count", err))?;
    let elements_bytes = shape
        .elements_bytes(count)
        .map_err(|err| flex_error("cannot size elements", err))?;
    let total_bytes = shape
        .total_bytes(count)
        .map_err(|err| flex_error("cannot size record", err))?;

    let out = SizeReport {
        schema_id: "https://schemas.3leaps.dev/flexprims/cli/v1/size-report.schema.json",
        shape: shape.to_string(),
        count,
        max_count: shape.max_count(),
        elements_bytes,
        total_bytes,
        within_ceiling: limits.check(elements_bytes).is_ok(),
    };
    print_report(&out, format);
    Ok(SUCCESS)
}
