//! Style reification
//!
//! The transform leaves a pending [`StyleMap`] on elements. Reification
//! turns them into markup, either by fabricating one CSS class per distinct
//! (element, declarations) pair and emitting a stylesheet, or by writing
//! `style` attributes. Class annotations (tooltip markers) are merged into
//! `class` afterwards, and the document's `style` element receives the
//! final stylesheet.

use crate::css::StyleMap;
use crate::markup::{Element, Markup};
use crate::settings::ConvertSettings;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Rules for revision tooltips, comment balloons and note links.
pub const TOOLTIP_CSS: &str = r#"
.wml-tooltip {
    position: relative;
    display: inline-block;
    color: #006080;
}
.wml-tooltip .wml-revtrk {
    visibility: hidden;
    position: absolute;
    width: 300px;
    border-color: black;
    border-width: 1px;
    border-style: solid;
    box-shadow: 3px 3px #cccccc;
    background-color: rgb(214,235,254);
    color: black;
    text-align: left;
    padding: 5px 5px 5px 15px;
    border-radius: 6px;
    z-index: 1;
    opacity: 0;
    transition: opacity .6s;
}
.wml-tooltip:hover .wml-revtrk {
    visibility: visible;
    opacity: 1;
}
.wml-tooltip:hover {
    visibility: visible;
}
.wml-tooltip-right {
    top: -7px;
}
.wml-tooltip-right::after {
    content: "";
    position: absolute;
    top: 50%;
    right: 100%;
    margin-top: -7px;
    border-width: 7px;
    border-style: solid;
    border-color: transparent black transparent transparent;
}
.wml-comment-initials {
    color: red;
    border-bottom: 1px dotted #ccc;
}
"#;

/// First value of the fabricated class counter; names use its digits after
/// the first.
const CLASS_COUNTER_START: u32 = 1_000_000;

fn visit<'e>(element: &'e Element, f: &mut impl FnMut(&'e Element)) {
    f(element);
    for child in element.children.iter().filter_map(Markup::as_element) {
        visit(child, f);
    }
}

fn visit_mut(element: &mut Element, f: &mut impl FnMut(&mut Element)) {
    f(element);
    for child in element.children.iter_mut().filter_map(Markup::as_element_mut) {
        visit_mut(child, f);
    }
}

fn append_class(element: &mut Element, class: &str) {
    let joined = match element.get_attr("class") {
        Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
        _ => class.to_string(),
    };
    element.set_attr("class", joined);
}

fn class_counter_suffix(counter: u32) -> String {
    counter.to_string()[1..].to_string()
}

/// Replace style maps by fabricated classes; returns the generated rules.
fn fabricate_classes(root: &mut Element, prefix: &str) -> String {
    let mut groups: IndexMap<String, (String, StyleMap)> = IndexMap::new();
    visit(root, &mut |e| {
        if let Some(style) = e.style.as_ref().filter(|s| !s.is_empty()) {
            groups
                .entry(style.class_key(&e.name))
                .or_insert_with(|| (e.name.clone(), style.clone()));
        }
    });

    let mut used: HashSet<String> = HashSet::new();
    let mut classes: HashMap<String, String> = HashMap::new();
    let mut counter = CLASS_COUNTER_START;
    let mut rules = String::from("\n");
    for (key, (element, style)) in &groups {
        let class = match style.style_name() {
            Some(name) => {
                let preferred = format!("{prefix}{name}");
                if used.contains(&preferred) {
                    let numbered = format!("{prefix}{name}-{}", class_counter_suffix(counter));
                    counter += 1;
                    numbered
                } else {
                    preferred
                }
            }
            None => {
                let numbered = format!("{prefix}{}", class_counter_suffix(counter));
                counter += 1;
                numbered
            }
        };
        used.insert(class.clone());

        rules.push_str(&format!("{element}.{class} {{\n"));
        for (property, value) in style.iter() {
            rules.push_str(&format!("    {property}: {value};\n"));
        }
        rules.push_str("}\n");
        classes.insert(key.clone(), class);
    }
    log::debug!("fabricated {} css classes", classes.len());

    visit_mut(root, &mut |e| {
        let Some(style) = e.style.take() else {
            return;
        };
        if style.is_empty() {
            return;
        }
        if let Some(class) = classes.get(&style.class_key(&e.name)) {
            append_class(e, class);
        }
    });
    rules
}

/// Write every style map as a `style` attribute.
fn inline_styles(root: &mut Element) {
    visit_mut(root, &mut |e| {
        let Some(style) = e.style.take() else {
            return;
        };
        let inline = style.to_inline();
        if inline.is_empty() {
            return;
        }
        let value = match e.get_attr("style") {
            Some(existing) => format!("{existing}{inline}"),
            None => inline,
        };
        e.set_attr("style", value);
    });
}

fn merge_class_annotations(root: &mut Element) {
    visit_mut(root, &mut |e| {
        if let Some(class) = e.class_annotation.take() {
            append_class(e, &class);
        }
    });
}

fn find_mut<'e>(element: &'e mut Element, name: &str) -> Option<&'e mut Element> {
    if element.name == name {
        return Some(element);
    }
    element
        .children
        .iter_mut()
        .filter_map(Markup::as_element_mut)
        .find_map(|child| find_mut(child, name))
}

/// Put the stylesheet in the existing `style` element, or a new one at the
/// end of `head`.
fn set_stylesheet(root: &mut Element, css: String) {
    if let Some(style) = find_mut(root, "style") {
        style.children = vec![Markup::Text(css)];
        return;
    }
    match find_mut(root, "head") {
        Some(head) => head.children.push(Element::new("style").text(css).into()),
        None => log::warn!("no head element to hold the stylesheet"),
    }
}

/// Turn pending style maps and class annotations into attributes and
/// install the stylesheet.
pub fn reify(root: &mut Element, settings: &ConvertSettings) {
    let css = if settings.fabricate_css_classes {
        let rules = fabricate_classes(root, &settings.css_class_prefix);
        format!(
            "{}{rules}{}{TOOLTIP_CSS}",
            settings.general_css, settings.additional_css
        )
    } else {
        inline_styles(root);
        crate::base_stylesheet(settings)
    };
    merge_class_annotations(root);
    set_stylesheet(root, css);
}
