// ********* Structure data structures ***********

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::Display;

/// One page of the questionnaire.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Section {
    pub id: u32,
    pub title: String,
    /// The "before" and "after" blocks, space-joined. Empty if there are none.
    pub info: String,
}

/// The classification of a data column.
///
/// The choice-based types follow the conventions of the exports: a fixed
/// response with a single category is one flag of a multi-select group,
/// hence `MultipleChoice`, while several categories make a `SingleChoice`.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize)]
#[serde(into = "String")]
pub enum ColumnType {
    SingleChoice,
    MultipleChoice,
    /// One row of a grid of sub-questions.
    Array,
    LongText,
    /// A format declared by the document (`integer`, `date`, ...).
    Declared(String),
}

impl ColumnType {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::SingleChoice => "single_choice",
            ColumnType::MultipleChoice => "multiple_choice",
            ColumnType::Array => "array",
            ColumnType::LongText => "longtext",
            ColumnType::Declared(format) => format.as_str(),
        }
    }

    /// The type of a column, given what its response declares.
    ///
    /// An explicit format always wins. Otherwise the number of choices decides,
    /// and a column with neither is free text.
    pub fn infer(format: Option<&str>, choices: Option<&Choices>) -> ColumnType {
        match (format, choices.map(|c| c.len())) {
            (Some(format), _) => ColumnType::from(format),
            (None, Some(n)) if n > 1 => ColumnType::SingleChoice,
            (None, Some(1)) => ColumnType::MultipleChoice,
            _ => ColumnType::LongText,
        }
    }
}

impl From<&str> for ColumnType {
    fn from(format: &str) -> ColumnType {
        match format {
            "single_choice" => ColumnType::SingleChoice,
            "multiple_choice" => ColumnType::MultipleChoice,
            "array" => ColumnType::Array,
            "longtext" => ColumnType::LongText,
            other => ColumnType::Declared(other.to_string()),
        }
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> String {
        column_type.as_str().to_string()
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The categories of a fixed response, from code to display label.
///
/// The order of the document is preserved, both when iterating and when
/// serializing.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Choices(Vec<(String, String)>);

impl Choices {
    pub fn new() -> Choices {
        Choices(Vec::new())
    }

    /// Inserts a category. A code seen before keeps its position and takes the new label.
    /// Returns the label that was replaced, if any.
    pub fn insert(&mut self, code: String, label: String) -> Option<String> {
        match self.0.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => Some(std::mem::replace(existing, label)),
            None => {
                self.0.push((code, label));
                None
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, label)| label.as_str())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }
}

impl FromIterator<(String, String)> for Choices {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut choices = Choices::new();
        for (code, label) in iter {
            choices.insert(code, label);
        }
        choices
    }
}

impl Serialize for Choices {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, label) in self.0.iter() {
            map.serialize_entry(code, label)?;
        }
        map.end()
    }
}

/// The description of one column of the response data.
///
/// A questionnaire question may produce several columns: one per sub-question,
/// one per response, plus one for each contingent (follow-up) question.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Column {
    /// The variable name, as found in the header of the response table.
    pub name: String,
    /// The prompt for this column specifically.
    pub label: String,
    pub format: Option<String>,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub length: Option<u32>,
    pub choices: Option<Choices>,
    pub question_group: String,
    pub question_label: String,
    pub question_description: String,
    pub section_id: u32,
    pub contingent_of_name: Option<String>,
    pub contingent_of_choice: Option<String>,
}

impl Column {
    pub fn is_contingent(&self) -> bool {
        self.contingent_of_name.is_some()
    }
}

/// The parsed structure of a questionnaire: its sections and all the data columns.
///
/// It is built once (see [`crate::parse_document`] or [`crate::builder::Builder`])
/// and never modified afterwards.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Structure {
    pub(crate) title: Option<String>,
    pub(crate) sections: Vec<Section>,
    pub(crate) columns: Vec<Column>,
    #[serde(skip)]
    pub(crate) section_index: HashMap<u32, usize>,
    #[serde(skip)]
    pub(crate) column_index: HashMap<String, usize>,
    // Positions of the columns of each group, in document order.
    #[serde(skip)]
    pub(crate) group_index: HashMap<String, Vec<usize>>,
    // Groups in the order they first appear.
    #[serde(skip)]
    pub(crate) group_order: Vec<String>,
    #[serde(skip)]
    pub(crate) section_column_index: HashMap<u32, Vec<usize>>,
}

impl Structure {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn section(&self, id: u32) -> Option<&Section> {
        self.section_index.get(&id).map(|idx| &self.sections[*idx])
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index.get(name).map(|idx| &self.columns[*idx])
    }

    /// The columns derived from one questionnaire question, in document order.
    pub fn columns_in_group(&self, group: &str) -> Vec<&Column> {
        self.group_index
            .get(group)
            .map(|idxs| idxs.iter().map(|idx| &self.columns[*idx]).collect())
            .unwrap_or_default()
    }

    /// The distinct question groups, in the order they first appear.
    pub fn groups(&self) -> Vec<&str> {
        self.group_order.iter().map(|g| g.as_str()).collect()
    }

    /// The columns of one section, in document order.
    pub fn section_columns(&self, section_id: u32) -> Vec<&Column> {
        self.section_column_index
            .get(&section_id)
            .map(|idxs| idxs.iter().map(|idx| &self.columns[*idx]).collect())
            .unwrap_or_default()
    }

    /// The label for a column name, or else the question label of a question group.
    pub fn label(&self, key: &str) -> Option<&str> {
        if let Some(c) = self.column(key) {
            return Some(c.label.as_str());
        }
        self.first_in_group(key).map(|c| c.question_label.as_str())
    }

    /// The choices for a column name, or else the choices shared by a question group.
    pub fn choices(&self, key: &str) -> Option<&Choices> {
        if let Some(c) = self.column(key) {
            return c.choices.as_ref();
        }
        self.first_in_group(key).and_then(|c| c.choices.as_ref())
    }

    /// The column that triggers a contingent column.
    pub fn contingent_parent(&self, column: &Column) -> Option<&Column> {
        column
            .contingent_of_name
            .as_deref()
            .and_then(|name| self.column(name))
    }

    fn first_in_group(&self, group: &str) -> Option<&Column> {
        self.group_index
            .get(group)
            .and_then(|idxs| idxs.first())
            .map(|idx| &self.columns[*idx])
    }
}
