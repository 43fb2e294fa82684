//! Paragraph content fix-ups ahead of measurement.

use crate::names::{W, XML};
use crate::source::{NodeId, Node, Part};

/// Run content that renders as something visible.
const VISIBLE: &[&str] = &[
    "dayLong",
    "dayShort",
    "drawing",
    "monthLong",
    "monthShort",
    "noBreakHyphen",
    "object",
    "pgNum",
    "ptab",
    "separator",
    "softHyphen",
    "sym",
    "t",
    "tab",
    "yearLong",
    "yearShort",
];

fn has_visible_content(paragraph: Node<'_>) -> bool {
    paragraph.elements().filter(|e| !e.is_w("pPr")).any(|e| {
        std::iter::once(e)
            .chain(e.descendants())
            .any(|d| VISIBLE.iter().any(|v| d.is_w(v)))
    })
}

/// Give every paragraph without visible content a run holding one space,
/// formatted like the paragraph mark, so it keeps its line height.
pub fn fill_empty_paragraphs(part: &mut Part) {
    let empty: Vec<(NodeId, Option<NodeId>)> = part
        .root()
        .descendants()
        .filter(|n| n.is_w("p") && !has_visible_content(*n))
        .map(|p| (p.id(), p.w_path(&["pPr", "rPr"]).map(|r| r.id())))
        .collect();
    for (paragraph, mark_properties) in empty {
        let run = part.tree.create_element(W, "r", &[]);
        if let Some(rpr) = mark_properties {
            let copy = part.tree.deep_clone(rpr);
            part.tree.append_child(run, copy);
        }
        let t = part.tree.create_element(W, "t", &[(XML, "space", "preserve")]);
        let space = part.tree.create_text(" ");
        part.tree.append_child(t, space);
        part.tree.append_child(run, t);
        part.tree.append_child(paragraph, run);
    }
}

/// Split runs so that every `w:tab` is alone in its own run.
///
/// The tab rendering replaces a whole run with a sized span; text sharing
/// the run with a tab would otherwise be lost or mis-measured.
pub fn isolate_tabs(part: &mut Part) {
    let mut splits: Vec<(NodeId, Option<NodeId>, Vec<Vec<NodeId>>)> = Vec::new();
    for run in part.root().descendants().filter(|n| n.is_w("r")) {
        let content: Vec<Node<'_>> = run.children().filter(|c| !c.is_w("rPr")).collect();
        if !content.iter().any(|c| c.is_w("tab")) || content.len() < 2 {
            continue;
        }
        let mut segments: Vec<Vec<NodeId>> = Vec::new();
        let mut current: Vec<NodeId> = Vec::new();
        for child in content {
            if child.is_w("tab") {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                segments.push(vec![child.id()]);
            } else {
                current.push(child.id());
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        if segments.len() > 1 {
            splits.push((run.id(), run.w_child("rPr").map(|r| r.id()), segments));
        }
    }

    for (run, rpr, segments) in splits {
        let mut anchor = run;
        for segment in segments.into_iter().skip(1) {
            let new_run = part.tree.shallow_clone(run);
            if let Some(rpr) = rpr {
                let copy = part.tree.deep_clone(rpr);
                part.tree.append_child(new_run, copy);
            }
            for child in segment {
                part.tree.append_child(new_run, child);
            }
            part.tree.insert_after(anchor, new_run);
            anchor = new_run;
        }
    }
}
