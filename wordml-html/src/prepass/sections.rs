//! Section assignment.
//!
//! A section descriptor (`sectPr`) closes the section it belongs to: it sits
//! in the properties of the section's last paragraph, except for the final
//! one, which is a direct child of the body. The final descriptor is moved
//! into the last paragraph so every descriptor is found the same way, then
//! every node is annotated with the descriptor that closes it.

use crate::names::W;
use crate::source::{NodeId, Part};

/// Letter-sized page with one-inch margins.
fn default_section(part: &mut Part) -> NodeId {
    let tree = &mut part.tree;
    let section = tree.create_element(W, "sectPr", &[]);
    let children = [
        tree.create_element(W, "pgSz", &[(W, "w", "12240"), (W, "h", "15840")]),
        tree.create_element(
            W,
            "pgMar",
            &[
                (W, "top", "1440"),
                (W, "right", "1440"),
                (W, "bottom", "1440"),
                (W, "left", "1440"),
                (W, "header", "720"),
                (W, "footer", "720"),
                (W, "gutter", "0"),
            ],
        ),
        tree.create_element(W, "cols", &[(W, "space", "720")]),
        tree.create_element(W, "docGrid", &[(W, "linePitch", "360")]),
    ];
    for child in children {
        tree.append_child(section, child);
    }
    section
}

/// Move the body's trailing `sectPr` into the last paragraph's `pPr`.
fn relocate_final_section(part: &mut Part) {
    let Some(body) = part.root().w_child("body") else {
        return;
    };
    let Some(section) = body.w_children("sectPr").last() else {
        return;
    };
    let Some(paragraph) = body.w_children("p").last() else {
        return;
    };
    let (section, paragraph, ppr) = (
        section.id(),
        paragraph.id(),
        paragraph.w_child("pPr").map(|p| p.id()),
    );
    let ppr = match ppr {
        Some(ppr) => ppr,
        None => {
            let ppr = part.tree.create_element(W, "pPr", &[]);
            part.tree.insert_child(paragraph, 0, ppr);
            ppr
        }
    };
    part.tree.append_child(ppr, section);
}

/// Annotate every node of the main part with its closing section descriptor.
pub fn annotate_sections(part: &mut Part) {
    relocate_final_section(part);

    let order: Vec<(NodeId, bool)> = part
        .root()
        .descendants()
        .map(|n| (n.id(), n.is_w("sectPr")))
        .collect();
    let mut current = match order.iter().rev().find(|(_, is_section)| *is_section) {
        Some((id, _)) => *id,
        None => default_section(part),
    };
    for (id, is_section) in order.into_iter().rev() {
        if is_section {
            current = id;
        } else {
            part.annotations.set_section(id, current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> Part {
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        Part::parse(&xml, "document").unwrap()
    }

    fn paragraph_sections(part: &Part) -> Vec<Option<String>> {
        part.root()
            .w_child("body")
            .unwrap()
            .w_children("p")
            .map(|p| {
                part.annotations
                    .section(p.id())
                    .map(|s| part.node(s).w_path(&["pgSz"]).and_then(|g| g.w_attr("w")).unwrap_or("").to_string())
            })
            .collect()
    }

    #[test]
    fn trailing_descriptor_moves_into_last_paragraph() {
        let mut part = document(
            r#"<w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="100"/></w:sectPr>"#,
        );
        annotate_sections(&mut part);
        let body = part.root().w_child("body").unwrap();
        assert!(body.w_child("sectPr").is_none());
        let last = body.w_children("p").last().unwrap();
        assert_eq!(last.elements().next().unwrap().local_name(), "pPr");
        assert!(last.w_path(&["pPr", "sectPr"]).is_some());
        assert_eq!(
            paragraph_sections(&part),
            vec![Some("100".to_string()), Some("100".to_string())]
        );
    }

    #[test]
    fn paragraphs_belong_to_the_following_descriptor() {
        let mut part = document(
            r#"<w:p><w:pPr><w:sectPr><w:pgSz w:w="1"/></w:sectPr></w:pPr></w:p><w:p/><w:sectPr><w:pgSz w:w="2"/></w:sectPr>"#,
        );
        annotate_sections(&mut part);
        assert_eq!(
            paragraph_sections(&part),
            vec![Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn missing_descriptor_gets_a_default() {
        let mut part = document(r#"<w:p/>"#);
        annotate_sections(&mut part);
        assert_eq!(paragraph_sections(&part), vec![Some("12240".to_string())]);
    }
}
