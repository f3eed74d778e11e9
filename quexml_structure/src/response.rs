use log::{debug, warn};
use roxmltree::Node;
use snafu::{ensure, OptionExt};

use crate::error::*;
use crate::model::Choices;
use crate::text::{child_text, children_named};

/// A response whose answer is typed by the respondent.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FreeResponse {
    pub name: String,
    pub format: Option<String>,
    pub length: Option<u32>,
    pub label: Option<String>,
}

/// A follow-up question attached to one category of a fixed response.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContingentResponse {
    pub name: String,
    pub text: Option<String>,
    pub format: Option<String>,
    pub length: Option<u32>,
    /// The name of the fixed response it hangs from.
    pub contingent_of_name: String,
    /// The code of the category that triggers it.
    pub contingent_of_choice: String,
}

/// A response picked from a list of categories.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FixedResponse {
    pub name: String,
    pub choices: Choices,
    pub contingent: Option<ContingentResponse>,
}

/// One answer-collection unit of a question, by shape.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Response {
    Free(FreeResponse),
    Fixed(FixedResponse),
}

impl Response {
    pub fn name(&self) -> &str {
        match self {
            Response::Free(r) => r.name.as_str(),
            Response::Fixed(r) => r.name.as_str(),
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            Response::Free(r) => r.format.as_deref(),
            Response::Fixed(_) => None,
        }
    }

    pub fn length(&self) -> Option<u32> {
        match self {
            Response::Free(r) => r.length,
            Response::Fixed(_) => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Response::Free(r) => r.label.as_deref(),
            Response::Fixed(_) => None,
        }
    }

    pub fn choices(&self) -> Option<&Choices> {
        match self {
            Response::Free(_) => None,
            Response::Fixed(r) => Some(&r.choices),
        }
    }

    pub fn contingent(&self) -> Option<&ContingentResponse> {
        match self {
            Response::Free(_) => None,
            Response::Fixed(r) => r.contingent.as_ref(),
        }
    }
}

/// Parses a `<response>` element.
///
/// Its first element child decides the shape and must be `<free>` or `<fixed>`.
pub fn parse_response(node: Node) -> StructureResult<Response> {
    let name = var_name(node, "response")?;
    let shape = node.children().find(|n| n.is_element());
    let tag = shape.map(|n| n.tag_name().name()).unwrap_or_default();
    let response = match (tag, shape) {
        ("free", Some(free)) => Response::Free(parse_free(name, free)),
        ("fixed", Some(fixed)) => Response::Fixed(parse_fixed(name, fixed)?),
        _ => {
            return UnknownResponseShapeSnafu { name, tag }.fail();
        }
    };
    debug!("parse_response: {:?}", response);
    Ok(response)
}

fn parse_free(name: String, node: Node) -> FreeResponse {
    let length = parse_length(&name, node);
    FreeResponse {
        format: child_text(node, "format").filter(|s| !s.is_empty()),
        label: child_text(node, "label").filter(|s| !s.is_empty()),
        length,
        name,
    }
}

fn parse_fixed(name: String, node: Node) -> StructureResult<FixedResponse> {
    let mut choices = Choices::new();
    let mut contingents: Vec<(String, Node)> = Vec::new();

    for category in children_named(node, "category") {
        let code = child_text(category, "value").context(MissingIdentifierSnafu {
            element: "category",
            field: "value",
        })?;
        let label = child_text(category, "label").unwrap_or_default();
        if let Some(previous) = choices.insert(code.clone(), label) {
            warn!(
                "parse_fixed: response {}: category {} defined twice, dropping label {:?}",
                name, code, previous
            );
        }
        for contingent in children_named(category, "contingentQuestion") {
            contingents.push((code.clone(), contingent));
        }
    }

    ensure!(
        contingents.len() <= 1,
        MultipleContingentsSnafu { name: name.as_str() }
    );

    let contingent = match contingents.pop() {
        Some((choice, contingent)) => {
            let contingent_name = var_name(contingent, "contingentQuestion")?;
            Some(ContingentResponse {
                text: child_text(contingent, "text").filter(|s| !s.is_empty()),
                format: child_text(contingent, "format").filter(|s| !s.is_empty()),
                length: parse_length(&contingent_name, contingent),
                name: contingent_name,
                contingent_of_name: name.clone(),
                contingent_of_choice: choice,
            })
        }
        None => None,
    };

    Ok(FixedResponse {
        name,
        choices,
        contingent,
    })
}

/// The `varName` attribute, which becomes the column name.
pub(crate) fn var_name(node: Node, element: &str) -> StructureResult<String> {
    node.attribute("varName")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context(MissingIdentifierSnafu {
            element,
            field: "varName attribute",
        })
}

fn parse_length(name: &str, node: Node) -> Option<u32> {
    let raw = child_text(node, "length")?;
    match raw.parse::<u32>() {
        Ok(length) => Some(length),
        Err(_) => {
            warn!("parse_length: {}: ignoring invalid length {:?}", name, raw);
            None
        }
    }
}
