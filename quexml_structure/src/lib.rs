/*!
Column structure of queXML questionnaires.

A queXML document (as exported by LimeSurvey) describes sections, questions,
sub-questions, answer categories and follow-up questions. This crate turns
it into the list of data columns of the matching response table, with for
each column its label, its type, its choices and the question it belongs to.

```
let xml = r#"
<questionnaire id="1">
  <section id="10">
    <sectionInfo><position>title</position><text>Demographics</text></sectionInfo>
    <question>
      <text>Gender?</text>
      <response varName="G">
        <fixed>
          <category><label>Male</label><value>M</value></category>
          <category><label>Female</label><value>F</value></category>
        </fixed>
      </response>
    </question>
  </section>
</questionnaire>"#;

let structure = quexml_structure::parse_document(xml)?;
assert_eq!(structure.sections()[0].title, "Demographics");
assert_eq!(structure.column("G").map(|c| c.column_type.as_str()), Some("single_choice"));
assert_eq!(structure.choices("G").and_then(|c| c.get("F")), Some("Female"));
# Ok::<(), quexml_structure::StructureError>(())
```

See the [`manual`] for the details of the rules.
*/

pub mod builder;
mod error;
pub mod manual;
mod model;
mod question;
mod response;
mod section;
mod text;

use log::{debug, info};
use snafu::{ensure, ResultExt};
use std::fs;
use std::path::Path;

pub use crate::error::{StructureError, StructureResult};
pub use crate::model::*;
pub use crate::question::{parse_question, question_group, SubQuestion};
pub use crate::response::{
    parse_response, ContingentResponse, FixedResponse, FreeResponse, Response,
};
pub use crate::section::parse_section;
pub use crate::text::clean_text;

use crate::builder::Builder;
use crate::error::*;
use crate::text::{child_text, children_named};

/// Parses a queXML document held in memory.
///
/// Either the whole document is understood and a complete structure is
/// returned, or the first problem found is returned as an error.
pub fn parse_document(xml: &str) -> StructureResult<Structure> {
    // Exports usually declare the queXML DTD.
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc =
        roxmltree::Document::parse_with_options(xml, options).context(MalformedXmlSnafu {})?;
    let root = doc.root_element();
    let root_tag = root.tag_name().name();
    ensure!(
        root_tag == "questionnaire",
        UnexpectedRootSnafu { tag: root_tag }
    );

    let title = child_text(root, "title").filter(|s| !s.is_empty());
    info!("parse_document: questionnaire {:?}", title);
    let mut builder = Builder::new().title(title);

    for section_node in children_named(root, "section") {
        let section = parse_section(section_node)?;
        let section_id = section.id;
        builder.add_section(section)?;
        for question_node in children_named(section_node, "question") {
            let columns = parse_question(question_node, section_id)?;
            builder.add_columns(columns)?;
        }
    }

    let structure = builder.build()?;
    info!(
        "parse_document: {} sections, {} columns",
        structure.sections().len(),
        structure.columns().len()
    );
    Ok(structure)
}

/// Reads and parses a queXML file.
pub fn read_structure<P: AsRef<Path>>(path: P) -> StructureResult<Structure> {
    let path_s = path.as_ref().display().to_string();
    debug!("read_structure: reading {:?}", path_s);
    let contents = fs::read_to_string(path.as_ref()).context(OpeningDocumentSnafu { path: path_s })?;
    parse_document(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../testdata/sample.xml");

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn sample_document() {
        init();
        let s = parse_document(SAMPLE).unwrap();
        assert_eq!(s.title(), Some("Customer survey"));

        let sections: Vec<(u32, &str)> = s
            .sections()
            .iter()
            .map(|x| (x.id, x.title.as_str()))
            .collect();
        assert_eq!(sections, vec![(1, "Demographics"), (2, "Experience")]);
        assert_eq!(s.section(1).map(|x| x.info.as_str()), Some("Intro text."));

        let names: Vec<&str> = s.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["G", "G_other", "AGE", "R", "S_1", "S_2", "F_SQ001", "F_SQ002", "F_other", "C"]
        );
        assert_eq!(s.groups(), vec!["G", "AGE", "R", "S", "F", "C"]);
        assert_eq!(s.section_columns(1).len(), 3);

        let other = s.column("G_other").unwrap();
        assert_eq!(other.label, "Gender? / Other");
        assert_eq!(s.contingent_parent(other).map(|c| c.name.as_str()), Some("G"));

        assert_eq!(
            s.column("AGE").map(|c| c.column_type.clone()),
            Some(ColumnType::Declared("integer".to_string()))
        );
        assert_eq!(s.label("S"), Some("How do you rate"));
        assert_eq!(s.label("S_2"), Some("the service"));
        assert_eq!(s.column("C").map(|c| c.label.as_str()), Some("Anything else?"));
    }

    #[test]
    fn parsing_is_idempotent() {
        let a = parse_document(SAMPLE).unwrap();
        let b = parse_document(SAMPLE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn column_invariants_on_sample() {
        let s = parse_document(SAMPLE).unwrap();
        for c in s.columns() {
            assert!(!c.question_group.is_empty());
            assert!(!c.column_type.as_str().is_empty());
            assert!(s.section(c.section_id).is_some());
            if let Some(parent_name) = &c.contingent_of_name {
                let parent = s.column(parent_name).unwrap();
                assert_eq!(parent.question_group, c.question_group);
                let choice = c.contingent_of_choice.as_deref().unwrap();
                assert!(parent.choices.as_ref().unwrap().contains(choice));
            }
        }
    }

    #[test]
    fn malformed_xml() {
        let err = parse_document("<questionnaire><section id=\"1\"></questionnaire>").unwrap_err();
        assert!(matches!(err, StructureError::MalformedXml { .. }));
    }

    #[test]
    fn doctype_declaration() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE questionnaire SYSTEM "queXML.dtd">
<questionnaire id="1">
  <section id="1">
    <sectionInfo><position>title</position><text>One</text></sectionInfo>
    <question><text>Name?</text><response varName="N"><free/></response></question>
  </section>
</questionnaire>"#;
        let s = parse_document(xml).unwrap();
        assert_eq!(s.columns().len(), 1);
        assert!(parse_document("<!DOCTYPE questionnaire SYSTEM \"queXML.dtd\"><questionnaire/>").is_ok());
    }

    #[test]
    fn wrong_root() {
        let err = parse_document("<survey/>").unwrap_err();
        assert!(matches!(err, StructureError::UnexpectedRoot { .. }));
    }

    #[test]
    fn errors_abort_the_whole_document() {
        let xml = r#"<questionnaire>
            <section id="1">
              <sectionInfo><position>title</position><text>One</text></sectionInfo>
              <question><text>Fine</text><response varName="A"><free><format>text</format></free></response></question>
              <question><text>Broken</text><response varName="B"><vas/></response></question>
            </section>
          </questionnaire>"#;
        let err = parse_document(xml).unwrap_err();
        assert!(matches!(err, StructureError::UnknownResponseShape { .. }));
    }

    #[test]
    fn duplicate_names_across_questions() {
        let xml = r#"<questionnaire>
            <section id="1">
              <sectionInfo><position>title</position><text>One</text></sectionInfo>
              <question><text>First</text><response varName="A"><free/></response></question>
              <question><text>Second</text><response varName="A"><free/></response></question>
            </section>
          </questionnaire>"#;
        let err = parse_document(xml).unwrap_err();
        assert!(matches!(err, StructureError::DuplicateColumnName { .. }));
    }

    #[test]
    fn empty_questionnaire() {
        let s = parse_document("<questionnaire/>").unwrap();
        assert!(s.sections().is_empty());
        assert!(s.columns().is_empty());
        assert_eq!(s.title(), None);
    }

    #[test]
    fn missing_file() {
        let err = read_structure("/nonexistent/questionnaire.xml").unwrap_err();
        assert!(matches!(err, StructureError::OpeningDocument { .. }));
    }
}
