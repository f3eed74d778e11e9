// Flat CSV views of a structure.

use std::io::Write;

use csv::Writer;
use quexml_structure::{Column, Structure};
use snafu::prelude::*;

use crate::quexml::*;

const COLUMN_HEADER: [&str; 12] = [
    "name",
    "label",
    "format",
    "type",
    "length",
    "choices",
    "question_group",
    "question_label",
    "question_description",
    "section_id",
    "contingent_of_name",
    "contingent_of_choice",
];

fn column_record(c: &Column) -> CliResult<Vec<String>> {
    let choices = match &c.choices {
        Some(choices) => serde_json::to_string(choices).context(SerializingJsonSnafu {})?,
        None => "".to_string(),
    };
    Ok(vec![
        c.name.clone(),
        c.label.clone(),
        c.format.clone().unwrap_or_default(),
        c.column_type.to_string(),
        c.length.map(|l| l.to_string()).unwrap_or_default(),
        choices,
        c.question_group.clone(),
        c.question_label.clone(),
        c.question_description.clone(),
        c.section_id.to_string(),
        c.contingent_of_name.clone().unwrap_or_default(),
        c.contingent_of_choice.clone().unwrap_or_default(),
    ])
}

/// One row per column. Absent values are empty cells and the choices are an inline JSON object.
pub fn write_columns_csv<W: Write>(structure: &Structure, w: W) -> CliResult<()> {
    let mut wtr = Writer::from_writer(w);
    wtr.write_record(COLUMN_HEADER).context(WritingCsvSnafu {})?;
    for c in structure.columns() {
        wtr.write_record(column_record(c)?)
            .context(WritingCsvSnafu {})?;
    }
    wtr.flush().context(WritingOutputSnafu {})?;
    Ok(())
}

/// One row per section, with the names of its columns separated by spaces.
pub fn write_sections_csv<W: Write>(structure: &Structure, w: W) -> CliResult<()> {
    let mut wtr = Writer::from_writer(w);
    wtr.write_record(["id", "title", "info", "columns"])
        .context(WritingCsvSnafu {})?;
    for section in structure.sections() {
        let names: Vec<&str> = structure
            .section_columns(section.id)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        wtr.write_record([
            section.id.to_string(),
            section.title.clone(),
            section.info.clone(),
            names.join(" "),
        ])
        .context(WritingCsvSnafu {})?;
    }
    wtr.flush().context(WritingOutputSnafu {})?;
    Ok(())
}
