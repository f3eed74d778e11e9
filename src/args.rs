use clap::Parser;

/// This program extracts the column structure of a queXML questionnaire.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The queXML document, as exported by LimeSurvey.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path, 'stdout' or empty) Where to write the structure. By default, it is
    /// written to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default json) The form of the output: 'json' for the full structure, 'csv' for one
    /// row per column, 'sections-csv' for one row per section.
    #[clap(long, value_parser)]
    pub output_type: Option<String>,

    /// (file path) A reference file containing the expected structure in JSON format. If provided,
    /// quexml will check that the structure matches the reference and fail otherwise.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
