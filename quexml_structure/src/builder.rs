pub use crate::model::*;

use log::debug;
use snafu::{ensure, OptionExt};
use std::collections::HashMap;

use crate::error::*;

/// A builder that assembles sections and columns into a [`Structure`].
///
/// The parser uses it, and it can also assemble a structure by hand, for
/// example to describe a response table that has no questionnaire document.
///
/// ```
/// use quexml_structure::builder::{Builder, Column, ColumnType, Section};
/// # use quexml_structure::StructureError;
///
/// let mut builder = Builder::new().title(Some("Poll".to_string()));
/// builder.add_section(Section {
///     id: 1,
///     title: "Opinions".to_string(),
///     info: "".to_string(),
/// })?;
/// builder.add_columns(vec![Column {
///     name: "Q1".to_string(),
///     label: "Any comment?".to_string(),
///     format: None,
///     column_type: ColumnType::LongText,
///     length: None,
///     choices: None,
///     question_group: "Q1".to_string(),
///     question_label: "Any comment?".to_string(),
///     question_description: "".to_string(),
///     section_id: 1,
///     contingent_of_name: None,
///     contingent_of_choice: None,
/// }])?;
/// let structure = builder.build()?;
///
/// assert_eq!(structure.label("Q1"), Some("Any comment?"));
/// # Ok::<(), StructureError>(())
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    _title: Option<String>,
    _sections: Vec<Section>,
    _columns: Vec<Column>,
    _section_index: HashMap<u32, usize>,
    _column_index: HashMap<String, usize>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn title(self, title: Option<String>) -> Builder {
        Builder {
            _title: title,
            ..self
        }
    }

    /// Adds a section. Section ids must be unique.
    pub fn add_section(&mut self, section: Section) -> StructureResult<()> {
        ensure!(
            !self._section_index.contains_key(&section.id),
            DuplicateSectionIdSnafu { id: section.id }
        );
        self._section_index
            .insert(section.id, self._sections.len());
        self._sections.push(section);
        Ok(())
    }

    /// Adds the columns of one question.
    ///
    /// The names must be unique across the whole structure and the section
    /// must have been added before.
    pub fn add_columns(&mut self, columns: Vec<Column>) -> StructureResult<()> {
        for c in columns {
            ensure!(
                self._section_index.contains_key(&c.section_id),
                UnknownSectionSnafu {
                    name: c.name.as_str(),
                    section_id: c.section_id
                }
            );
            ensure!(
                !self._column_index.contains_key(&c.name),
                DuplicateColumnNameSnafu {
                    name: c.name.as_str()
                }
            );
            self._column_index.insert(c.name.clone(), self._columns.len());
            self._columns.push(c);
        }
        Ok(())
    }

    /// Checks the links between columns and freezes the structure.
    pub fn build(self) -> StructureResult<Structure> {
        for c in self._columns.iter() {
            check_contingent_link(c, &self._columns, &self._column_index)?;
        }

        let mut group_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut group_order: Vec<String> = Vec::new();
        let mut section_column_index: HashMap<u32, Vec<usize>> = HashMap::new();
        for (idx, c) in self._columns.iter().enumerate() {
            let group = group_index.entry(c.question_group.clone()).or_default();
            if group.is_empty() {
                group_order.push(c.question_group.clone());
            }
            group.push(idx);
            section_column_index
                .entry(c.section_id)
                .or_default()
                .push(idx);
        }
        debug!(
            "build: {} sections, {} columns, {} groups",
            self._sections.len(),
            self._columns.len(),
            group_index.len()
        );

        Ok(Structure {
            title: self._title,
            sections: self._sections,
            columns: self._columns,
            section_index: self._section_index,
            column_index: self._column_index,
            group_index,
            group_order,
            section_column_index,
        })
    }
}

// A contingent column must point to a column of its own group that offers the triggering choice.
fn check_contingent_link(
    column: &Column,
    columns: &[Column],
    index: &HashMap<String, usize>,
) -> StructureResult<()> {
    let (parent_name, choice) = match (&column.contingent_of_name, &column.contingent_of_choice) {
        (None, None) => return Ok(()),
        (parent, choice) => (
            parent.clone().unwrap_or_default(),
            choice.clone().unwrap_or_default(),
        ),
    };
    let broken = || BrokenContingentLinkSnafu {
        name: column.name.as_str(),
        parent: parent_name.as_str(),
        choice: choice.as_str(),
    };
    let parent = index
        .get(&parent_name)
        .map(|idx| &columns[*idx])
        .with_context(broken)?;
    let offers_choice = parent
        .choices
        .as_ref()
        .map(|c| c.contains(&choice))
        .unwrap_or(false);
    ensure!(
        parent.question_group == column.question_group && offers_choice,
        broken()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: u32) -> Section {
        Section {
            id,
            title: format!("Section {}", id),
            info: "".to_string(),
        }
    }

    fn column(name: &str, group: &str, section_id: u32) -> Column {
        Column {
            name: name.to_string(),
            label: name.to_string(),
            format: None,
            column_type: ColumnType::LongText,
            length: None,
            choices: None,
            question_group: group.to_string(),
            question_label: group.to_string(),
            question_description: "".to_string(),
            section_id,
            contingent_of_name: None,
            contingent_of_choice: None,
        }
    }

    fn choice_column(name: &str, codes: &[&str]) -> Column {
        let mut c = column(name, name, 1);
        c.choices = Some(
            codes
                .iter()
                .map(|code| (code.to_string(), code.to_uppercase()))
                .collect(),
        );
        c.column_type = ColumnType::infer(None, c.choices.as_ref());
        c
    }

    fn contingent(name: &str, parent: &str, choice: &str, group: &str) -> Column {
        let mut c = column(name, group, 1);
        c.contingent_of_name = Some(parent.to_string());
        c.contingent_of_choice = Some(choice.to_string());
        c
    }

    #[test]
    fn duplicate_section() {
        let mut b = Builder::new();
        b.add_section(section(1)).unwrap();
        let err = b.add_section(section(1)).unwrap_err();
        assert!(matches!(err, StructureError::DuplicateSectionId { id: 1 }));
    }

    #[test]
    fn duplicate_column() {
        let mut b = Builder::new();
        b.add_section(section(1)).unwrap();
        b.add_columns(vec![column("A", "A", 1)]).unwrap();
        let err = b.add_columns(vec![column("A", "B", 1)]).unwrap_err();
        assert!(matches!(err, StructureError::DuplicateColumnName { .. }));
    }

    #[test]
    fn unknown_section() {
        let mut b = Builder::new();
        b.add_section(section(1)).unwrap();
        let err = b.add_columns(vec![column("A", "A", 2)]).unwrap_err();
        assert!(matches!(
            err,
            StructureError::UnknownSection { section_id: 2, .. }
        ));
    }

    #[test]
    fn valid_contingent_link() {
        let mut b = Builder::new();
        b.add_section(section(1)).unwrap();
        b.add_columns(vec![
            choice_column("G", &["m", "-oth-"]),
            contingent("G_other", "G", "-oth-", "G"),
        ])
        .unwrap();
        let s = b.build().unwrap();
        let other = s.column("G_other").unwrap();
        assert_eq!(s.contingent_parent(other).map(|c| c.name.as_str()), Some("G"));
    }

    #[test]
    fn contingent_on_missing_choice() {
        let mut b = Builder::new();
        b.add_section(section(1)).unwrap();
        b.add_columns(vec![
            choice_column("G", &["m", "f"]),
            contingent("G_other", "G", "-oth-", "G"),
        ])
        .unwrap();
        let err = b.build().unwrap_err();
        assert!(matches!(err, StructureError::BrokenContingentLink { .. }));
    }

    #[test]
    fn contingent_on_missing_parent() {
        let mut b = Builder::new();
        b.add_section(section(1)).unwrap();
        b.add_columns(vec![contingent("G_other", "G", "-oth-", "G")])
            .unwrap();
        assert!(matches!(
            b.build(),
            Err(StructureError::BrokenContingentLink { .. })
        ));
    }

    #[test]
    fn contingent_in_another_group() {
        let mut b = Builder::new();
        b.add_section(section(1)).unwrap();
        b.add_columns(vec![
            choice_column("G", &["m", "-oth-"]),
            contingent("H_other", "G", "-oth-", "H"),
        ])
        .unwrap();
        assert!(matches!(
            b.build(),
            Err(StructureError::BrokenContingentLink { .. })
        ));
    }

    #[test]
    fn lookups() {
        let mut b = Builder::new().title(Some("Survey".to_string()));
        b.add_section(section(1)).unwrap();
        b.add_section(section(2)).unwrap();
        let mut grid_a = column("S_1", "S", 1);
        grid_a.question_label = "Rate".to_string();
        grid_a.choices = Some(vec![("1".to_string(), "Bad".to_string())].into_iter().collect());
        let mut grid_b = grid_a.clone();
        grid_b.name = "S_2".to_string();
        b.add_columns(vec![grid_a, grid_b]).unwrap();
        b.add_columns(vec![column("T", "T", 2)]).unwrap();
        let s = b.build().unwrap();

        assert_eq!(s.title(), Some("Survey"));
        assert_eq!(s.section(2).map(|x| x.title.as_str()), Some("Section 2"));
        assert_eq!(s.section(3), None);
        assert_eq!(s.groups(), vec!["S", "T"]);
        assert_eq!(s.columns_in_group("S").len(), 2);
        assert!(s.columns_in_group("nope").is_empty());
        assert_eq!(s.label("S_1"), Some("S_1"));
        assert_eq!(s.label("S"), Some("Rate"));
        assert_eq!(s.label("nope"), None);
        assert_eq!(s.choices("S").and_then(|c| c.get("1")), Some("Bad"));
        assert_eq!(s.choices("T"), None);
        assert_eq!(s.section_columns(2).len(), 1);
        assert!(s.section_columns(3).is_empty());
    }

    #[test]
    fn groups_and_sections_follow_document_order() {
        let mut b = Builder::new();
        b.add_section(section(2)).unwrap();
        b.add_section(section(1)).unwrap();
        b.add_columns(vec![column("Z_1", "Z", 2), column("Z_2", "Z", 2)])
            .unwrap();
        b.add_columns(vec![column("A", "A", 1)]).unwrap();
        b.add_columns(vec![column("M", "M", 2)]).unwrap();
        let s = b.build().unwrap();

        assert_eq!(s.groups(), vec!["Z", "A", "M"]);
        let names: Vec<&str> = s
            .section_columns(2)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Z_1", "Z_2", "M"]);
        assert_eq!(s.section_columns(1).len(), 1);
    }
}
