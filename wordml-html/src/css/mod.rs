//! CSS property derivation
//!
//! Every formatting property of the source vocabulary maps to zero or more
//! CSS declarations collected in a [`StyleMap`]. The submodules hold the
//! mapping rules:
//!
//! | Module        | Source                         | Produces                          |
//! |---------------|--------------------------------|-----------------------------------|
//! | [`paragraph`] | `pPr`                          | margins, indents, alignment, line height |
//! | [`run`]       | `rPr`                          | font, size, decoration, position  |
//! | [`border`]    | `pBdr`, `tcBorders` sides      | `border-*`, `padding-*`           |
//! | [`shading`]   | `shd`                          | blended `background`              |
//! | [`color`]     | named/hex colors               | CSS color values                  |
//! | [`font`]      | font names, `sz`               | `font-family` with fallbacks, `font-size` |
//!
//! Properties are only ever added when missing, so the first rule that
//! claims a property wins and re-running a derivation is a no-op.

pub mod border;
pub mod color;
pub mod font;
pub mod paragraph;
pub mod run;
pub mod shading;

use std::collections::BTreeMap;

/// Accumulated CSS declarations for one output element, plus the name of the
/// source style they came from (used to name fabricated classes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    props: BTreeMap<String, String>,
    style_name: Option<String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` unless the property is already present.
    pub fn add_if_missing(&mut self, property: &str, value: impl Into<String>) {
        if !self.props.contains_key(property) {
            self.props.insert(property.to_string(), value.into());
        }
    }

    /// Replace a property unconditionally.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        self.props.insert(property.to_string(), value.into());
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.props.remove(property)
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.props.get(property).map(String::as_str)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.props.contains_key(property)
    }

    pub fn style_name(&self) -> Option<&str> {
        self.style_name.as_deref()
    }

    pub fn set_style_name(&mut self, name: impl Into<String>) {
        self.style_name = Some(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.style_name.is_none()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Declarations in property-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `k: v;` pairs in property order, concatenated without separators.
    pub fn to_inline(&self) -> String {
        self.iter().map(|(k, v)| format!("{k}: {v};")).collect()
    }

    /// Grouping key for class fabrication: element name plus every
    /// declaration, including the originating style name.
    pub fn class_key(&self, element: &str) -> String {
        let mut key = format!("{element}|");
        if let Some(name) = &self.style_name {
            key.push_str(&format!("-style-name: {name};"));
        }
        key.push_str(&self.to_inline());
        key
    }
}

/// Points with the shortest exact decimal form, `"0"` for zero.
pub(crate) fn pt(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}pt")
    }
}

/// Inches with two decimals when positive, `"0"` otherwise.
pub(crate) fn positive_inches(value: f64) -> String {
    if value > 0.0 {
        format!("{value:.2}in")
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_if_missing_keeps_first_value() {
        let mut style = StyleMap::new();
        style.add_if_missing("color", "red");
        style.add_if_missing("color", "blue");
        assert_eq!(style.get("color"), Some("red"));
        style.set("color", "blue");
        assert_eq!(style.get("color"), Some("blue"));
    }

    #[test]
    fn inline_form_is_sorted() {
        let mut style = StyleMap::new();
        style.add_if_missing("margin-top", "0");
        style.add_if_missing("color", "red");
        style.add_if_missing("font-weight", "bold");
        insta::assert_snapshot!(style.to_inline(), @"color: red;font-weight: bold;margin-top: 0;");
    }

    #[test]
    fn style_name_participates_in_class_key_only() {
        let mut a = StyleMap::new();
        a.add_if_missing("color", "red");
        let mut b = a.clone();
        b.set_style_name("Heading1");
        assert_eq!(a.to_inline(), b.to_inline());
        assert_ne!(a.class_key("p"), b.class_key("p"));
        assert!(!b.is_empty());
    }

    #[test]
    fn number_helpers() {
        assert_eq!(pt(0.0), "0");
        assert_eq!(pt(12.0), "12pt");
        assert_eq!(pt(6.5), "6.5pt");
        assert_eq!(positive_inches(0.5), "0.50in");
        assert_eq!(positive_inches(-0.25), "0");
    }

    proptest! {
        #[test]
        fn insertion_order_does_not_change_serialization(
            entries in proptest::collection::vec(("[a-z]{1,6}", "[a-z0-9]{1,4}"), 0..12)
        ) {
            let mut forward = StyleMap::new();
            for (k, v) in &entries {
                forward.add_if_missing(k, v.clone());
            }
            let mut again = forward.clone();
            for (k, v) in &entries {
                again.add_if_missing(k, v.clone());
            }
            prop_assert_eq!(forward.to_inline(), again.to_inline());

            let mut sorted: Vec<_> = forward.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
            sorted.reverse();
            let mut reversed = StyleMap::new();
            for (k, v) in sorted {
                reversed.add_if_missing(&k, v);
            }
            prop_assert_eq!(forward.to_inline(), reversed.to_inline());
        }
    }
}
