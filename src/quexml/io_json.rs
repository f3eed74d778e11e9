// JSON output and reference files.

use std::fs;
use std::io::Write;

use log::debug;
use quexml_structure::Structure;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::quexml::*;

/// Writes the structure as pretty-printed JSON, keeping the document order.
pub fn write_json<W: Write>(structure: &Structure, mut w: W) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut w, structure).context(SerializingJsonSnafu {})?;
    writeln!(w).context(WritingOutputSnafu {})?;
    Ok(())
}

pub fn structure_to_json(structure: &Structure) -> CliResult<JSValue> {
    serde_json::to_value(structure).context(SerializingJsonSnafu {})
}

pub fn read_reference(path: &str) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningReferenceSnafu { path })?;
    debug!("read_reference: {} bytes from {:?}", contents.len(), path);
    serde_json::from_str(contents.as_str()).context(ParsingReferenceSnafu { path })
}
