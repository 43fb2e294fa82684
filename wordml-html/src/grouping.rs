//! Grouping of adjacent block-level siblings.
//!
//! Paragraphs sharing a border descriptor are framed by one bordered `div`;
//! paragraphs of one list, or of one style with contextual spacing, lose the
//! spacing after every member but the last.

use crate::names::PT;
use crate::source::Node;

/// Split `items` into runs of adjacent items with equal keys.
pub fn group_adjacent<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<(K, Vec<T>)>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match groups.last_mut() {
            Some((last, members)) if *last == k => members.push(item),
            _ => groups.push((k, vec![item])),
        }
    }
    groups
}

/// How a block-level element is framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockGroup {
    Plain,
    Table,
    /// Serialized paragraph border and indentation.
    Bordered(String),
}

pub fn block_group(node: &Node<'_>) -> BlockGroup {
    if let Some(border) = node.w_path(&["pPr", "pBdr"]) {
        let indent = node
            .w_path(&["pPr", "ind"])
            .map(|ind| ind.outer_xml())
            .unwrap_or_default();
        return BlockGroup::Bordered(border.outer_xml() + &indent);
    }
    if node.is_w("tbl") {
        BlockGroup::Table
    } else {
        BlockGroup::Plain
    }
}

/// Key of a vertical spacing group; `None` for stand-alone elements.
pub fn spacing_group(node: &Node<'_>) -> Option<String> {
    if let Some(list) = node.attr(PT, "AbstractNumId") {
        return Some(format!("num:{list}"));
    }
    node.w_path(&["pPr", "contextualSpacing"])?;
    node.w_path(&["pPr", "pStyle"])
        .and_then(|s| s.w_attr("val"))
        .map(|style| format!("sty:{style}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Part;

    #[test]
    fn groups_only_adjacent_items() {
        let groups = group_adjacent(vec![1, 1, 2, 1, 3, 3], |n| *n % 2);
        let sizes: Vec<(i32, usize)> = groups.iter().map(|(k, v)| (*k, v.len())).collect();
        assert_eq!(sizes, vec![(1, 2), (0, 1), (1, 3)]);
    }

    #[test]
    fn block_and_spacing_keys() {
        let xml = r#"<w:body xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:pt="http://powertools.codeplex.com/2011">
            <w:p><w:pPr><w:pBdr><w:top w:val="single"/></w:pBdr><w:ind w:left="720"/></w:pPr></w:p>
            <w:tbl/>
            <w:p pt:AbstractNumId="4"/>
            <w:p><w:pPr><w:pStyle w:val="Quote"/><w:contextualSpacing/></w:pPr></w:p>
            <w:p><w:pPr><w:contextualSpacing/></w:pPr></w:p>
        </w:body>"#;
        let part = Part::parse(xml, "document").unwrap();
        let nodes: Vec<_> = part.root().elements().collect();
        assert!(matches!(block_group(&nodes[0]), BlockGroup::Bordered(_)));
        assert_eq!(block_group(&nodes[1]), BlockGroup::Table);
        assert_eq!(block_group(&nodes[2]), BlockGroup::Plain);
        assert_eq!(spacing_group(&nodes[2]).as_deref(), Some("num:4"));
        assert_eq!(spacing_group(&nodes[3]).as_deref(), Some("sty:Quote"));
        assert_eq!(spacing_group(&nodes[4]), None);
        assert_eq!(spacing_group(&nodes[0]), None);
    }
}
