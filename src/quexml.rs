use log::{debug, info, warn};

use quexml_structure::{read_structure, Structure, StructureError};
use snafu::{prelude::*, Snafu};

use std::fs::File;
use std::io::{self, Write};
use text_diff::print_diff;

mod io_csv;
mod io_json;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("{source}"))]
    Structure { source: StructureError },
    #[snafu(display("Error creating output file {path}"))]
    CreatingOutput { source: io::Error, path: String },
    #[snafu(display("Error writing the output"))]
    WritingOutput { source: io::Error },
    #[snafu(display("Error serializing the structure to JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing a CSV record"))]
    WritingCsv { source: csv::Error },
    #[snafu(display("Error opening reference file {path}"))]
    OpeningReference { source: io::Error, path: String },
    #[snafu(display("Error parsing reference file {path}"))]
    ParsingReference {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the structure and the reference {path}"))]
    ReferenceMismatch { path: String },
    #[snafu(display("Unknown output type {output_type:?} (expected json, csv or sections-csv)"))]
    UnknownOutputType { output_type: String },
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum OutputType {
    Json,
    Csv,
    SectionsCsv,
}

fn parse_output_type(output_type: &Option<String>) -> CliResult<OutputType> {
    match output_type.as_deref() {
        None | Some("json") => Ok(OutputType::Json),
        Some("csv") => Ok(OutputType::Csv),
        Some("sections-csv") => Ok(OutputType::SectionsCsv),
        Some(x) => UnknownOutputTypeSnafu { output_type: x }.fail(),
    }
}

fn open_output(out: &Option<String>) -> CliResult<Box<dyn Write>> {
    match out.as_deref() {
        None | Some("") | Some("stdout") => Ok(Box::new(io::stdout())),
        Some(path) => {
            info!("open_output: writing to {:?}", path);
            let f = File::create(path).context(CreatingOutputSnafu { path })?;
            Ok(Box::new(f))
        }
    }
}

fn check_reference(structure: &Structure, reference_path: &str) -> CliResult<()> {
    let computed = io_json::structure_to_json(structure)?;
    let reference = io_json::read_reference(reference_path)?;
    debug!("check_reference: reference: {:?}", reference);
    let pretty_computed = serde_json::to_string_pretty(&computed).context(SerializingJsonSnafu {})?;
    let pretty_reference =
        serde_json::to_string_pretty(&reference).context(SerializingJsonSnafu {})?;
    if pretty_reference != pretty_computed {
        warn!("Found differences with the reference structure");
        print_diff(pretty_reference.as_str(), pretty_computed.as_str(), "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("check_reference: structure matches {:?}", reference_path);
    Ok(())
}

/// Parses a questionnaire and writes its structure.
///
/// When a reference is given, the structure is also compared to it, whatever
/// the output type.
pub fn run_structure(
    input: &str,
    out: &Option<String>,
    output_type: &Option<String>,
    reference: &Option<String>,
) -> CliResult<()> {
    let output_type = parse_output_type(output_type)?;
    let structure = read_structure(input).context(StructureSnafu {})?;
    info!(
        "run_structure: {:?}: {} sections, {} columns",
        input,
        structure.sections().len(),
        structure.columns().len()
    );

    let mut w = open_output(out)?;
    match output_type {
        OutputType::Json => io_json::write_json(&structure, &mut w)?,
        OutputType::Csv => io_csv::write_columns_csv(&structure, &mut w)?,
        OutputType::SectionsCsv => io_csv::write_sections_csv(&structure, &mut w)?,
    }
    w.flush().context(WritingOutputSnafu {})?;

    if let Some(reference_path) = reference {
        check_reference(&structure, reference_path)?;
    }
    Ok(())
}
