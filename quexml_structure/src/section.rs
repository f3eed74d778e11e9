use log::{debug, warn};
use roxmltree::Node;
use snafu::OptionExt;

use crate::error::*;
use crate::model::Section;
use crate::text::{child_text, children_named, joined_child_text};

/// Reads the numeric `id` attribute of a `<section>`.
pub(crate) fn section_id(node: Node) -> StructureResult<u32> {
    let raw = node.attribute("id").context(MissingIdentifierSnafu {
        element: "section",
        field: "id attribute",
    })?;
    raw.trim()
        .parse::<u32>()
        .ok()
        .context(InvalidIdentifierSnafu {
            element: "section",
            value: raw,
        })
}

/// Parses the id, the title and the descriptive blocks of a `<section>`.
///
/// The blocks are `<sectionInfo>` elements tagged by a `<position>`: the
/// `title` one gives the title, `before` and `after` ones are joined into
/// the info text.
pub fn parse_section(node: Node) -> StructureResult<Section> {
    let id = section_id(node)?;

    let mut title: Option<String> = None;
    let mut info_parts: Vec<String> = Vec::new();
    for info in children_named(node, "sectionInfo") {
        let position = child_text(info, "position").unwrap_or_default();
        let text = joined_child_text(info, "text");
        match position.as_str() {
            "title" if title.is_some() => {
                warn!(
                    "parse_section: section {}: ignoring extra title block {:?}",
                    id, text
                );
            }
            "title" => title = Some(text),
            "before" | "after" => {
                if !text.is_empty() {
                    info_parts.push(text);
                }
            }
            _ => {
                return UnexpectedPositionSnafu {
                    section_id: id,
                    position,
                }
                .fail();
            }
        }
    }

    let title = title.context(MissingTitleSnafu { section_id: id })?;
    let section = Section {
        id,
        title,
        info: info_parts.join(" "),
    };
    debug!("parse_section: {:?}", section);
    Ok(section)
}
