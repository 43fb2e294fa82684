//! The recursive markup transform
//!
//! [`Transformer::convert_node`] dispatches on the qualified name of a
//! source node and returns the markup it produces; the first matching case
//! wins and anything unrecognized produces nothing:
//!
//! | Source                               | Markup                                  |
//! |--------------------------------------|-----------------------------------------|
//! | `document`                           | `html` with `head` and `body`           |
//! | `body`                               | one `div` per run of equal sections     |
//! | `p`                                  | `p` or `h1`..`h6` ([`paragraph`])       |
//! | `hyperlink` with `r:id` / `w:anchor` | `a`                                     |
//! | `ins`, `del`, `moveFrom`, `moveTo`   | runs in revision mode                   |
//! | comment, footnote, endnote reference | link, content deferred ([`notes`])      |
//! | `r`                                  | styled `span` ([`run`])                 |
//! | `bookmarkStart`                      | named `a`                               |
//! | `t`, `delText`                       | text                                    |
//! | `sym`                                | `span` with the symbol character        |
//! | `tab`, `br`, `cr`, `noBreakHyphen`   | sized spans, breaks, `-`                |
//! | `tbl`, `tr`, `tc`                    | table markup ([`table`])                |
//! | `drawing`, `pict`, `object`          | image handler output ([`image`])        |
//! | `sdt`, `smartTag`, `fldSimple`       | their content                           |
//!
//! Block-level siblings pass through two groupings first (see
//! [`crate::grouping`]): shared paragraph borders become one bordered `div`,
//! and list or contextually spaced paragraphs lose their trailing spacing
//! except for the last one.

pub mod image;
mod notes;
mod paragraph;
mod run;
pub mod state;
mod table;

use crate::css::border::{add_border_sides, BorderContext};
use crate::css::{positive_inches, StyleMap};
use crate::document::WordDocument;
use crate::fields::FieldInstruction;
use crate::grouping::{block_group, group_adjacent, spacing_group, BlockGroup};
use crate::markup::{has_edge_whitespace, Element, Markup};
use crate::measure::Measurer;
use crate::names::{R, W};
use crate::package::DocumentPackage;
use crate::settings::ConvertSettings;
use crate::source::Node;
use state::{format_date, RevisionKind, TransformMode, TransformState};

/// Value of the `Generator` meta element.
pub const GENERATOR: &str = concat!("wordml-html ", env!("CARGO_PKG_VERSION"));

/// Whitespace at either end of a text longer than one character must be
/// marked as significant.
pub(crate) fn needs_preserve(text: &str) -> bool {
    text.chars().nth(1).is_some() && has_edge_whitespace(text)
}

/// Converts one document. Holds the state shared by the whole walk.
pub struct Transformer<'a> {
    doc: &'a WordDocument,
    package: &'a dyn DocumentPackage,
    settings: &'a ConvertSettings,
    state: TransformState<'a>,
}

impl<'a> Transformer<'a> {
    pub fn new(
        doc: &'a WordDocument,
        package: &'a dyn DocumentPackage,
        settings: &'a ConvertSettings,
        measurer: &'a Measurer,
    ) -> Self {
        Self {
            doc,
            package,
            settings,
            state: TransformState::new(measurer),
        }
    }

    /// Convert the main document and append the deferred comments,
    /// footnotes and endnotes to the body. `None` when the main part has no
    /// `document` root.
    pub fn run(mut self) -> Option<Element> {
        let root = self.doc.main.root();
        let mut html = self
            .convert_node(root, false, 0.0, &TransformMode::default())
            .into_iter()
            .find_map(|m| match m {
                Markup::Element(e) if e.name == "html" => Some(e),
                _ => None,
            })?;

        let deferred = std::mem::take(&mut self.state.deferred);
        let body = html
            .children
            .iter_mut()
            .filter_map(Markup::as_element_mut)
            .find(|e| e.name == "body");
        if let Some(body) = body {
            for group in [deferred.comments, deferred.footnotes, deferred.endnotes] {
                if group.is_empty() {
                    continue;
                }
                log::debug!("appending {} deferred nodes", group.len());
                let div = Element::new("div")
                    .child(Element::new("hr"))
                    .children(group)
                    .child(Element::new("br"));
                body.children.push(div.into());
            }
        }
        Some(html)
    }

    /// Convert one source node.
    pub fn convert_node(
        &mut self,
        node: Node<'a>,
        suppress_trailing_whitespace: bool,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Vec<Markup> {
        let Some(name) = node.name() else {
            return Vec::new();
        };
        if name.ns != W {
            return Vec::new();
        }

        match name.local.as_str() {
            "document" => vec![self.document(node, mode).into()],
            "body" => {
                let body = Element::new("body").children(self.section_divs(node, mode));
                vec![body.into()]
            }
            "p" => self.paragraph(node, suppress_trailing_whitespace, margin_left, mode),
            "hyperlink" if node.attr(R, "id").is_some() => {
                self.hyperlink_to_relationship(node, margin_left, mode)
            }
            "hyperlink" if node.w_attr("anchor").is_some() => {
                vec![self.hyperlink_to_bookmark(node, mode).into()]
            }
            "ins" | "del" | "moveFrom" | "moveTo" if node.w_child("r").is_some() => {
                self.revision(node)
            }
            "commentReference" => self.comment_reference(node, suppress_trailing_whitespace, margin_left, mode),
            "footnoteReference" | "endnoteReference" => {
                self.note_reference(node, suppress_trailing_whitespace, margin_left, mode)
            }
            "r" => self.convert_run(node, mode),
            "bookmarkStart" => bookmark(node).into_iter().map(Markup::from).collect(),
            "t" | "delText" => vec![Markup::text(node.value())],
            "sym" => symbol(node).into_iter().map(Markup::from).collect(),
            "tab" => vec![self.tab(node).into()],
            "br" | "cr" => line_break(node),
            "noBreakHyphen" => vec![Markup::text("-")],
            "tbl" => vec![self.table(node, margin_left, mode).into()],
            "tr" => vec![self.table_row(node, margin_left, mode).into()],
            "tc" => self.table_cell(node, mode).into_iter().map(Markup::from).collect(),
            "drawing" | "pict" | "object" => self.image(node).into_iter().collect(),
            "sdt" => self.content_control(node, margin_left, mode),
            "smartTag" => self.border_divs(node.elements().collect(), mode),
            "fldSimple" => self.simple_field(node, mode),
            _ => Vec::new(),
        }
    }

    fn convert_all(
        &mut self,
        nodes: impl IntoIterator<Item = Node<'a>>,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Vec<Markup> {
        let mut out = Vec::new();
        for node in nodes {
            out.extend(self.convert_node(node, false, margin_left, mode));
        }
        out
    }

    fn document(&mut self, node: Node<'a>, mode: &TransformMode) -> Element {
        let head = Element::new("head")
            .child(Element::new("meta").attr("charset", "UTF-8"))
            .child(Element::new("title").text(self.settings.page_title.clone()))
            .child(
                Element::new("meta")
                    .attr("name", "Generator")
                    .attr("content", GENERATOR),
            );
        let mut html = Element::new("html").child(head);
        for child in node.elements() {
            let converted = self.convert_node(child, false, 0.0, mode);
            html.children.extend(converted);
        }
        html
    }

    /// One `div` per run of adjacent body children sharing a section
    /// descriptor.
    fn section_divs(&mut self, body: Node<'a>, mode: &TransformMode) -> Vec<Markup> {
        let part = body.part();
        let groups = group_adjacent(body.elements(), |e| {
            part.annotations
                .section(e.id())
                .map(|s| part.node(s).outer_xml())
                .unwrap_or_default()
        });

        let mut out = Vec::with_capacity(groups.len());
        for (_, members) in groups {
            let bidi = part
                .annotations
                .section(members[0].id())
                .is_some_and(|s| part.node(s).w_flag("bidi"));
            let mut div = Element::new("div");
            if bidi {
                div.set_attr("dir", "rtl");
            }
            div.children = self.border_divs(members, mode);
            out.push(div.into());
        }
        out
    }

    /// Frame runs of paragraphs sharing a border in one bordered `div`.
    pub(crate) fn border_divs(&mut self, elements: Vec<Node<'a>>, mode: &TransformMode) -> Vec<Markup> {
        let mut out = Vec::new();
        for (key, group) in group_adjacent(elements, block_group) {
            match key {
                BlockGroup::Plain => out.extend(self.spaced(group, 0.0, mode)),
                BlockGroup::Table => out.extend(self.convert_all(group, 0.0, mode)),
                BlockGroup::Bordered(_) => {
                    let ppr = group[0].w_child("pPr");
                    let mut style = StyleMap::new();
                    add_border_sides(
                        &mut style,
                        ppr.and_then(|p| p.w_child("pBdr")),
                        BorderContext::Paragraph,
                    );

                    let mut margin_left = 0.0;
                    if let Some(ind) = ppr.and_then(|p| p.w_child("ind")) {
                        let left = ind.w_int("left").unwrap_or(0) as f64 / 1440.0;
                        let hanging = ind.w_int("hanging").unwrap_or(0) as f64 / 1440.0;
                        margin_left = left - hanging;
                        style.add_if_missing("margin-left", positive_inches(margin_left));
                    }

                    let children = self.spaced(group, margin_left, mode);
                    out.push(Element::new("div").children(children).with_style(style).into());
                }
            }
        }
        out
    }

    /// Convert block siblings, dropping the trailing spacing of every member
    /// of a list or contextual-spacing group except the last.
    fn spaced(&mut self, elements: Vec<Node<'a>>, margin_left: f64, mode: &TransformMode) -> Vec<Markup> {
        let mut out = Vec::new();
        for (key, group) in group_adjacent(elements, spacing_group) {
            let last = group.len() - 1;
            for (i, node) in group.into_iter().enumerate() {
                let suppress = key.is_some() && i != last;
                out.extend(self.convert_node(node, suppress, margin_left, mode));
            }
        }
        out
    }

    fn hyperlink_to_relationship(
        &mut self,
        node: Node<'a>,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Vec<Markup> {
        let id = node.attr(R, "id").unwrap_or_default();
        let target = self.package.relationship(id).map(|r| r.target);
        if let Some(target) = &target {
            if !is_valid_uri(target) {
                log::warn!("hyperlink {id} has a malformed target {target:?}, dropping the link");
                return self.convert_all(node.elements(), margin_left, mode);
            }
        } else {
            log::warn!("hyperlink relationship {id} not found");
        }

        let mut a = Element::new("a");
        if let Some(target) = target {
            a.set_attr("href", target);
        }
        for run in node.w_children("r") {
            let converted = self.convert_run(run, mode);
            a.children.extend(converted);
        }
        vec![a.into()]
    }

    fn hyperlink_to_bookmark(&mut self, node: Node<'a>, mode: &TransformMode) -> Element {
        let anchor = node.w_attr("anchor").unwrap_or_default();
        let mut a = Element::new("a").attr("href", format!("#{anchor}"));
        for run in node.w_children("r") {
            let converted = self.convert_run(run, mode);
            a.children.extend(converted);
        }
        let mut style = StyleMap::new();
        style.add_if_missing("text-decoration", "none");
        a.with_style(style)
    }

    /// Runs of a revision wrapper, converted in the wrapper's mode.
    fn revision(&mut self, node: Node<'a>) -> Vec<Markup> {
        let Some(kind) = RevisionKind::from_element(node.local_name()) else {
            return Vec::new();
        };
        let mode = match node.w_attr("author") {
            Some(author) => {
                let date = node.w_attr("date").map(format_date).unwrap_or_default();
                TransformMode::attributed(kind, author, &date)
            }
            None => TransformMode::revision(kind),
        };
        let mut out = Vec::new();
        for child in node.elements() {
            let converted = if child.is_w("r") {
                self.convert_run(child, &mode)
            } else {
                self.convert_node(child, false, 0.0, &mode)
            };
            out.extend(converted);
        }
        out
    }

    /// Content controls: run-level ones are flattened in place, block-level
    /// ones go through the block grouping.
    fn content_control(&mut self, node: Node<'a>, margin_left: f64, mode: &TransformMode) -> Vec<Markup> {
        let content: Vec<Node<'a>> = node
            .w_children("sdtContent")
            .flat_map(|c| c.elements())
            .collect();
        let run_level = node
            .ancestors()
            .take_while(|a| !a.is_w("txbxContent"))
            .any(|a| a.is_w("p"));
        if run_level {
            self.convert_all(content, margin_left, mode)
        } else {
            self.border_divs(content, mode)
        }
    }

    /// Simple fields are flattened; `HYPERLINK` fields become anchors.
    fn simple_field(&mut self, node: Node<'a>, mode: &TransformMode) -> Vec<Markup> {
        let content = self.border_divs(node.elements().collect(), mode);
        let href = node
            .w_attr("instr")
            .and_then(|instr| FieldInstruction::parse(instr).hyperlink_href());
        match href {
            Some(href) => vec![Element::new("a").attr("href", href).children(content).into()],
            None => content,
        }
    }
}

/// Relationship targets must parse as absolute URLs or as references
/// relative to a web base.
fn is_valid_uri(target: &str) -> bool {
    match url::Url::parse(target) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse("http://localhost/")
            .and_then(|base| base.join(target))
            .is_ok(),
        Err(_) => false,
    }
}

fn bookmark(node: Node<'_>) -> Option<Element> {
    let name = node.w_attr("name")?;
    let mut style = StyleMap::new();
    style.add_if_missing("text-decoration", "none");
    Some(Element::new("a").attr("id", name).with_style(style))
}

fn symbol(node: Node<'_>) -> Option<Element> {
    let code = node.w_attr("char")?;
    let Some(c) = u32::from_str_radix(code, 16).ok().and_then(char::from_u32) else {
        log::warn!("symbol with invalid character code {code:?}");
        return None;
    };
    Some(Element::new("span").child(Markup::CharRef(c)))
}

/// `br` followed by a directional mark, and a span restoring the first-line
/// indent when the break was measured.
fn line_break(node: Node<'_>) -> Vec<Markup> {
    let mark = if paragraph_is_bidi(node) {
        crate::markup::RLM
    } else {
        crate::markup::LRM
    };
    let mut out = vec![Element::new("br").into(), Markup::CharRef(mark)];
    if let Some(annotation) = node.annotations().tab(node.id()) {
        let mut style = StyleMap::new();
        style.add_if_missing("margin", format!("0 0 0 {:.2}in", annotation.inches()));
        style.add_if_missing("padding", "0 0 0 0");
        out.push(Element::new("span").with_style(style).into());
    }
    out
}

pub(crate) fn is_bidi(paragraph: Node<'_>) -> bool {
    paragraph
        .w_child("pPr")
        .is_some_and(|ppr| ppr.w_flag("bidi"))
}

/// Whether the paragraph enclosing `node` is right-to-left.
pub(crate) fn paragraph_is_bidi(node: Node<'_>) -> bool {
    node.ancestors().find(|a| a.is_w("p")).is_some_and(is_bidi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{MetricsSource, MonospaceMetrics};
    use crate::package::MemoryPackage;
    use crate::source::Part;

    pub(crate) const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:pt="http://powertools.codeplex.com/2011""#;

    /// Document with the given body, run through the pre-passes.
    pub(crate) fn document(body: &str) -> WordDocument {
        let xml = format!("<w:document {NS}><w:body>{body}</w:body></w:document>");
        let mut doc = WordDocument::load(&MemoryPackage::new(xml)).unwrap();
        let measurer = Measurer::new(MetricsSource::Monospace(MonospaceMetrics::default()));
        crate::prepass::run(&mut doc, &measurer);
        doc
    }

    pub(crate) fn convert_with(
        doc: &WordDocument,
        package: &MemoryPackage,
        settings: &ConvertSettings,
    ) -> Element {
        let measurer = Measurer::new(MetricsSource::Monospace(MonospaceMetrics::default()));
        Transformer::new(doc, package, settings, &measurer).run().unwrap()
    }

    pub(crate) fn convert(body: &str) -> Element {
        convert_with(&document(body), &MemoryPackage::empty(), &ConvertSettings::default())
    }

    pub(crate) fn body(html: &Element) -> &Element {
        html.find("body").unwrap()
    }

    #[test]
    fn document_has_head_and_body() {
        let html = convert("<w:p><w:r><w:t>Hi</w:t></w:r></w:p>");
        let head = html.find("head").unwrap();
        assert_eq!(head.find("title").unwrap().text_content(), "");
        assert_eq!(head.children.len(), 3);
        assert_eq!(body(&html).text_content(), "Hi");
    }

    #[test]
    fn sections_become_divs() {
        let html = convert(
            r#"<w:p><w:pPr><w:sectPr><w:pgSz w:w="100"/></w:sectPr></w:pPr><w:r><w:t>a</w:t></w:r></w:p>
               <w:p><w:r><w:t>b</w:t></w:r></w:p>
               <w:sectPr><w:bidi/><w:pgSz w:w="200"/></w:sectPr>"#,
        );
        let divs: Vec<&Element> = body(&html)
            .children
            .iter()
            .filter_map(Markup::as_element)
            .collect();
        assert_eq!(divs.len(), 2);
        assert_eq!(divs[0].get_attr("dir"), None);
        assert_eq!(divs[1].get_attr("dir"), Some("rtl"));
        assert_eq!(divs[1].text_content().trim_matches('\u{200F}'), "b");
    }

    #[test]
    fn bordered_paragraphs_share_a_div() {
        let border = r#"<w:pPr><w:pBdr><w:top w:val="single" w:sz="4"/></w:pBdr><w:ind w:left="1440" w:hanging="720"/></w:pPr>"#;
        let html = convert(&format!(
            "<w:p>{border}<w:r><w:t>a</w:t></w:r></w:p><w:p>{border}<w:r><w:t>b</w:t></w:r></w:p><w:p><w:r><w:t>c</w:t></w:r></w:p>"
        ));
        let section = body(&html).find("div").unwrap();
        let framed = section.children[0].as_element().unwrap();
        assert_eq!(framed.name, "div");
        let style = framed.style.as_ref().unwrap();
        assert_eq!(style.get("margin-left"), Some("0.50in"));
        assert_eq!(style.get("border-right"), Some("none"));
        let mut paragraphs = Vec::new();
        framed.find_all("p", &mut paragraphs);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(section.children[1].as_element().unwrap().name, "p");
    }

    #[test]
    fn list_items_suppress_all_but_last_spacing() {
        let item = r#"<w:pPr><w:spacing w:after="240"/></w:pPr><w:r><w:t>x</w:t></w:r>"#;
        let html = convert(&format!(
            r#"<w:p pt:AbstractNumId="1">{item}</w:p><w:p pt:AbstractNumId="1">{item}</w:p>"#
        ));
        let mut paragraphs = Vec::new();
        body(&html).find_all("p", &mut paragraphs);
        let after: Vec<Option<&str>> = paragraphs
            .iter()
            .map(|p| p.style.as_ref().and_then(|s| s.get("margin-bottom")))
            .collect();
        assert_eq!(after, vec![Some("0"), Some("12pt")]);
    }

    #[test]
    fn hyperlinks_resolve_relationships() {
        let doc = document(
            r#"<w:p><w:hyperlink r:id="rId5"><w:r><w:t>site</w:t></w:r></w:hyperlink>
               <w:hyperlink r:id="rId6"><w:r><w:t>bad</w:t></w:r></w:hyperlink>
               <w:hyperlink w:anchor="intro"><w:r><w:t>up</w:t></w:r></w:hyperlink></w:p>"#,
        );
        let package = MemoryPackage::empty()
            .with_hyperlink("rId5", "https://example.com/a")
            .with_hyperlink("rId6", "http://[bad");
        let html = convert_with(&doc, &package, &ConvertSettings::default());
        let mut links = Vec::new();
        body(&html).find_all("a", &mut links);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].get_attr("href"), Some("https://example.com/a"));
        assert_eq!(links[1].get_attr("href"), Some("#intro"));
        assert!(body(&html).text_content().contains("bad"));
    }

    #[test]
    fn small_elements() {
        let html = convert(
            r#"<w:p><w:bookmarkStart w:id="0" w:name="intro"/><w:r><w:t>a</w:t><w:noBreakHyphen/><w:sym w:font="Symbol" w:char="F0B7"/><w:br/><w:t>b</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#,
        );
        let body = body(&html);
        assert_eq!(body.find("a").unwrap().get_attr("id"), Some("intro"));
        assert!(body.find("br").is_some());
        let text = body.text_content();
        assert!(text.contains("a-\u{F0B7}"));
        assert!(text.contains("\u{200E}b"));
    }

    #[test]
    fn run_level_content_control_is_flattened() {
        let html = convert(
            r#"<w:p><w:sdt><w:sdtContent><w:r><w:t>inside</w:t></w:r></w:sdtContent></w:sdt></w:p>
               <w:sdt><w:sdtContent><w:p><w:r><w:t>block</w:t></w:r></w:p></w:sdtContent></w:sdt>"#,
        );
        let mut paragraphs = Vec::new();
        body(&html).find_all("p", &mut paragraphs);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text_content(), "inside");
        assert_eq!(paragraphs[1].text_content(), "block");
    }

    #[test]
    fn simple_hyperlink_field_becomes_anchor() {
        let html = convert(
            r#"<w:p><w:fldSimple w:instr=" HYPERLINK &quot;http://example.com&quot; \l &quot;top&quot; "><w:r><w:t>go</w:t></w:r></w:fldSimple>
               <w:fldSimple w:instr=" PAGE "><w:r><w:t>3</w:t></w:r></w:fldSimple></w:p>"#,
        );
        let a = body(&html).find("a").unwrap();
        assert_eq!(a.get_attr("href"), Some("http://example.com#top"));
        assert_eq!(a.text_content(), "go");
        assert!(body(&html).text_content().ends_with('3'));
    }

    #[test]
    fn unknown_and_foreign_nodes_are_dropped() {
        let doc = document(r#"<w:p><w:proofErr w:type="spellStart"/><w:r><w:t>a</w:t></w:r><pt:Extra/></w:p>"#);
        let package = MemoryPackage::empty();
        let settings = ConvertSettings::default();
        let measurer = Measurer::new(MetricsSource::Monospace(MonospaceMetrics::default()));
        let mut transformer = Transformer::new(&doc, &package, &settings, &measurer);
        let paragraph = doc.main.root().descendants().find(|n| n.is_w("p")).unwrap();
        for child in paragraph.elements().filter(|c| !c.is_w("r")) {
            assert!(transformer
                .convert_node(child, false, 0.0, &TransformMode::default())
                .is_empty());
        }
    }

    #[test]
    fn uri_validation() {
        assert!(is_valid_uri("https://example.com/x?y=1"));
        assert!(is_valid_uri("mailto:someone@example.com"));
        assert!(is_valid_uri("docs/readme.html"));
        assert!(!is_valid_uri("http://[bad"));
        assert!(needs_preserve(" a"));
        assert!(!needs_preserve(" "));
    }
}
