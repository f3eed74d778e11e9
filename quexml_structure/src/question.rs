use log::{debug, warn};
use roxmltree::Node;
use snafu::{ensure, OptionExt};

use crate::error::*;
use crate::model::{Column, ColumnType};
use crate::response::{parse_response, var_name, Response};
use crate::text::{children_named, joined_child_text, node_text};

/// A row of a grid question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SubQuestion {
    pub name: String,
    pub label: String,
}

// What is shared by all the columns of one question.
struct QuestionHeader {
    group: String,
    label: String,
    description: String,
    section_id: u32,
}

impl QuestionHeader {
    fn column(
        &self,
        name: &str,
        label: String,
        response: &Response,
        column_type: ColumnType,
    ) -> Column {
        Column {
            name: name.to_string(),
            label,
            format: response.format().map(|s| s.to_string()),
            column_type,
            length: response.length(),
            choices: response.choices().cloned(),
            question_group: self.group.clone(),
            question_label: self.label.clone(),
            question_description: self.description.clone(),
            section_id: self.section_id,
            contingent_of_name: None,
            contingent_of_choice: None,
        }
    }
}

/// Parses a `<question>` element into the columns it produces, in order.
///
/// A question with sub-questions is a grid: one column per sub-question, all
/// sharing the single response. Otherwise each response gives a column,
/// directly followed by the column of its contingent question, if any.
pub fn parse_question(node: Node, section_id: u32) -> StructureResult<Vec<Column>> {
    let label = question_label(node, section_id)?;
    let description = question_description(node, &label);

    let subquestions: Vec<SubQuestion> = children_named(node, "subQuestion")
        .map(|sq| {
            Ok(SubQuestion {
                name: var_name(sq, "subQuestion")?,
                label: joined_child_text(sq, "text"),
            })
        })
        .collect::<StructureResult<Vec<SubQuestion>>>()?;

    let responses: Vec<Response> = children_named(node, "response")
        .map(parse_response)
        .collect::<StructureResult<Vec<Response>>>()?;
    ensure!(
        !responses.is_empty(),
        MissingResponseSnafu {
            question: label.as_str()
        }
    );

    let names: Vec<&str> = responses.iter().map(|r| r.name()).collect();
    let header = QuestionHeader {
        group: question_group(&names)?,
        label,
        description,
        section_id,
    };

    let columns = match (subquestions.as_slice(), responses.as_slice()) {
        ([], responses) => flat_columns(&header, responses),
        (subquestions, [response]) if response.contingent().is_none() => {
            grid_columns(&header, subquestions, response)
        }
        (_, _) => {
            return UnsupportedCombinationSnafu {
                question: header.label.as_str(),
            }
            .fail();
        }
    };
    debug!(
        "parse_question: group {}: {} columns",
        header.group,
        columns.len()
    );
    Ok(columns)
}

fn grid_columns(
    header: &QuestionHeader,
    subquestions: &[SubQuestion],
    response: &Response,
) -> Vec<Column> {
    let column_type = match response.format() {
        Some(format) => ColumnType::from(format),
        None => ColumnType::Array,
    };
    subquestions
        .iter()
        .map(|sq| header.column(&sq.name, sq.label.clone(), response, column_type.clone()))
        .collect()
}

fn flat_columns(header: &QuestionHeader, responses: &[Response]) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::new();
    for response in responses.iter() {
        let label = response
            .label()
            .map(|s| s.to_string())
            .unwrap_or_else(|| header.label.clone());
        let column_type = ColumnType::infer(response.format(), response.choices());
        let column = header.column(response.name(), label, response, column_type);

        let contingent_column = response.contingent().map(|contingent| {
            let suffix = match contingent.text.as_deref() {
                Some(text) => text.to_string(),
                None => column
                    .choices
                    .as_ref()
                    .and_then(|c| c.get(&contingent.contingent_of_choice))
                    .unwrap_or_default()
                    .to_string(),
            };
            Column {
                name: contingent.name.clone(),
                label: format!("{} / {}", column.label, suffix),
                format: contingent.format.clone(),
                column_type: ColumnType::infer(contingent.format.as_deref(), None),
                length: contingent.length,
                choices: None,
                question_group: header.group.clone(),
                question_label: header.label.clone(),
                question_description: header.description.clone(),
                section_id: header.section_id,
                contingent_of_name: Some(contingent.contingent_of_name.clone()),
                contingent_of_choice: Some(contingent.contingent_of_choice.clone()),
            }
        });

        columns.push(column);
        columns.extend(contingent_column);
    }
    columns
}

/// The text of the question, from its first `<text>` child.
fn question_label(node: Node, section_id: u32) -> StructureResult<String> {
    let mut texts = children_named(node, "text");
    let label = texts
        .next()
        .map(node_text)
        .context(MissingQuestionLabelSnafu { section_id })?;
    let extra = texts.count();
    if extra > 0 {
        warn!(
            "question_label: question {:?} has {} extra text blocks, using the first one",
            label, extra
        );
    }
    Ok(label)
}

/// The help text of the question, from its first `<directive>`. Empty if none.
fn question_description(node: Node, label: &str) -> String {
    let mut directives = children_named(node, "directive");
    let description = directives
        .next()
        .map(|d| joined_child_text(d, "text"))
        .unwrap_or_default();
    let extra = directives.count();
    if extra > 0 {
        warn!(
            "question_description: question {:?} has {} extra directives, using the first one",
            label, extra
        );
    }
    description
}

/// The name shared by all the columns of a question.
///
/// With a single response it is the response name. Otherwise it is the common
/// prefix of all the response names, cut at its first underscore.
pub fn question_group(names: &[&str]) -> StructureResult<String> {
    match names {
        [] => EmptyGroupNameSnafu {}.fail(),
        [single] => Ok(single.to_string()),
        [first, rest @ ..] => {
            let prefix = common_prefix(first, rest);
            let group = prefix.split('_').next().unwrap_or_default();
            ensure!(
                !group.is_empty(),
                EmptyQuestionGroupSnafu {
                    names: names.iter().map(|s| s.to_string()).collect::<Vec<String>>()
                }
            );
            Ok(group.to_string())
        }
    }
}

fn common_prefix<'a>(first: &'a str, others: &[&str]) -> &'a str {
    let mut end = first.len();
    for other in others {
        let shared: usize = first
            .chars()
            .zip(other.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        end = end.min(shared);
    }
    &first[..end]
}
