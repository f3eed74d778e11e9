use snafu::Snafu;

/// Everything that stops a questionnaire from being turned into a structure.
///
/// All the variants are fatal: the document is rejected as a whole and no
/// partial structure is returned.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StructureError {
    #[snafu(display("Error opening questionnaire file {path}"))]
    OpeningDocument {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Malformed XML in questionnaire: {source}"))]
    MalformedXml { source: roxmltree::Error },

    #[snafu(display("Expected root element <questionnaire>, found <{tag}>"))]
    UnexpectedRoot { tag: String },

    #[snafu(display("Element <{element}> is missing its {field}"))]
    MissingIdentifier { element: String, field: String },

    #[snafu(display("Element <{element}> has an invalid identifier {value:?}"))]
    InvalidIdentifier { element: String, value: String },

    #[snafu(display("Section {section_id} has no title block"))]
    MissingTitle { section_id: u32 },

    #[snafu(display("Section {section_id}: unexpected sectionInfo position {position:?}"))]
    UnexpectedPosition { section_id: u32, position: String },

    #[snafu(display("Response {name}: unknown response shape <{tag}>"))]
    UnknownResponseShape { name: String, tag: String },

    #[snafu(display("Response {name}: more than one contingent question"))]
    MultipleContingents { name: String },

    #[snafu(display("Section {section_id}: question without title text"))]
    MissingQuestionLabel { section_id: u32 },

    #[snafu(display("Question {question:?} has no response element"))]
    MissingResponse { question: String },

    #[snafu(display(
        "Question {question:?}: sub-questions require a single response without contingent question"
    ))]
    UnsupportedCombination { question: String },

    #[snafu(display("Cannot derive a question group from zero responses"))]
    EmptyGroupName {},

    #[snafu(display("Responses {names:?} share no common identifier prefix"))]
    EmptyQuestionGroup { names: Vec<String> },

    #[snafu(display("Section id {id} is used more than once"))]
    DuplicateSectionId { id: u32 },

    #[snafu(display("Column name {name} is used more than once"))]
    DuplicateColumnName { name: String },

    #[snafu(display("Column {name} refers to unknown section {section_id}"))]
    UnknownSection { name: String, section_id: u32 },

    #[snafu(display(
        "Contingent column {name} points to {parent}/{choice}, which is not a choice of its group"
    ))]
    BrokenContingentLink {
        name: String,
        parent: String,
        choice: String,
    },
}

pub type StructureResult<T> = Result<T, StructureError>;
