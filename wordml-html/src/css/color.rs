//! Color value mapping.

/// Highlight and text color names with a fixed CSS rendering.
fn named_color(name: &str) -> Option<&'static str> {
    let css = match name {
        "black" => "black",
        "blue" => "blue",
        "cyan" => "aqua",
        "green" => "green",
        "magenta" => "fuchsia",
        "red" => "red",
        "yellow" => "yellow",
        "white" => "white",
        "darkBlue" => "#00008B",
        "darkCyan" => "#008B8B",
        "darkGreen" => "#006400",
        "darkMagenta" => "#800080",
        "darkRed" => "#8B0000",
        "darkYellow" => "#808000",
        "darkGray" => "#A9A9A9",
        "lightGray" => "#D3D3D3",
        "none" => "",
        _ => return None,
    };
    Some(css)
}

/// CSS value for a text (`color`) or fill (`background`) property.
///
/// `auto` resolves to black for text and white for fills. Returns `None`
/// when the color is `none`, so the property should be left unset.
pub fn color_property(property: &str, value: &str) -> Option<String> {
    if value == "auto" {
        return Some(if property == "color" { "black" } else { "white" }.to_string());
    }
    match named_color(value) {
        Some("") => None,
        Some(css) => Some(css.to_string()),
        None => Some(format!("#{value}")),
    }
}

/// CSS value for shading and border colors; `auto` is white and `none`
/// renders black.
pub fn convert_color(value: &str) -> String {
    if value == "auto" {
        return "white".to_string();
    }
    match named_color(value) {
        Some("") => "black".to_string(),
        Some(css) => css.to_string(),
        None => format!("#{value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_depends_on_property() {
        assert_eq!(color_property("color", "auto").as_deref(), Some("black"));
        assert_eq!(color_property("background", "auto").as_deref(), Some("white"));
    }

    #[test]
    fn named_and_hex() {
        assert_eq!(color_property("color", "cyan").as_deref(), Some("aqua"));
        assert_eq!(color_property("background", "darkRed").as_deref(), Some("#8B0000"));
        assert_eq!(color_property("color", "FF0000").as_deref(), Some("#FF0000"));
        assert_eq!(color_property("background", "none"), None);
    }

    #[test]
    fn convert_color_fallbacks() {
        assert_eq!(convert_color("auto"), "white");
        assert_eq!(convert_color("none"), "black");
        assert_eq!(convert_color("magenta"), "fuchsia");
        assert_eq!(convert_color("1F3864"), "#1F3864");
    }
}
