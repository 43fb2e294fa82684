//! Pictures
//!
//! DrawingML (`w:drawing`) and legacy VML (`w:pict`, `w:object`) pictures
//! are resolved to their embedded part, decoded, and handed to the
//! configured [`ImageHandler`](crate::settings::ImageHandler) together with
//! the display size declared in the document. Without a handler, or for
//! formats other than PNG, GIF, TIFF and JPEG, pictures are dropped.

use super::Transformer;
use crate::markup::{Element, Markup};
use crate::names::{A, PIC, R, V, WP};
use crate::source::Node;
use base64::Engine;
use std::io::Cursor;

const EMUS_PER_INCH: f32 = 914_400.0;

/// Content types passed to the image handler.
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &["image/png", "image/gif", "image/tiff", "image/jpeg"];

/// What the image handler receives for one picture.
pub struct ImageInfo<'a> {
    pub image: &'a image::DynamicImage,
    /// Declared display size as a `style` attribute value.
    pub img_style: Option<String>,
    pub content_type: &'a str,
    /// The `drawing`, `pict` or `object` element.
    pub source: Node<'a>,
    pub alt_text: String,
}

/// Image handler embedding the picture as a PNG `data:` URI.
pub fn inline_image_handler(info: &ImageInfo<'_>) -> Option<Markup> {
    let mut png = Vec::new();
    if let Err(e) = info
        .image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
    {
        log::warn!("could not re-encode image as PNG: {e}");
        return None;
    }
    let data = base64::engine::general_purpose::STANDARD.encode(&png);
    let mut img = Element::new("img").attr("src", format!("data:image/png;base64,{data}"));
    if let Some(style) = &info.img_style {
        img.set_attr("style", style.clone());
    }
    img.set_attr("alt", info.alt_text.clone());
    Some(img.into())
}

/// `width` or `height` of a VML shape style, when given in points.
fn vml_size_points(style: &str, name: &str) -> Option<f32> {
    style
        .split(';')
        .filter_map(|token| token.split_once(':'))
        .find(|(key, _)| key.trim() == name)
        .and_then(|(_, value)| value.trim().strip_suffix("pt"))
        .and_then(|number| number.parse().ok())
}

impl<'a> Transformer<'a> {
    pub(super) fn image(&mut self, node: Node<'a>) -> Option<Markup> {
        self.settings.image_handler.as_ref()?;
        if node.is_w("drawing") {
            self.drawing(node)
        } else {
            self.picture(node)
        }
    }

    /// Decode the embedded part and run the handler.
    fn render_image(
        &self,
        rel_id: &str,
        source: Node<'a>,
        img_style: Option<String>,
        alt_text: String,
    ) -> Option<Markup> {
        let handler = self.settings.image_handler.as_ref()?;
        let Some(part) = self.package.embedded_part(rel_id) else {
            log::warn!("image relationship {rel_id} not found");
            return None;
        };
        if !SUPPORTED_CONTENT_TYPES.contains(&part.content_type.as_str()) {
            log::debug!("skipping image of type {}", part.content_type);
            return None;
        }
        let decoded = match image::load_from_memory(&part.bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("could not decode image {rel_id}: {e}");
                return None;
            }
        };
        let info = ImageInfo {
            image: &decoded,
            img_style,
            content_type: &part.content_type,
            source,
            alt_text,
        };
        handler(&info)
    }

    fn drawing(&mut self, node: Node<'a>) -> Option<Markup> {
        let container = node
            .elements()
            .find(|e| e.is(WP, "inline") || e.is(WP, "anchor"))?;

        let href = node
            .child(WP, "inline")
            .and_then(|inline| inline.child(WP, "docPr"))
            .and_then(|doc_pr| doc_pr.child(A, "hlinkClick"))
            .and_then(|link| link.attr(R, "id"))
            .and_then(|id| self.package.relationship(id))
            .map(|rel| rel.target);

        let extent = container.child(WP, "extent");
        let size = |name: &str| {
            extent
                .and_then(|e| e.attr("", name))
                .and_then(|v| v.parse::<i64>().ok())
        };
        let img_style = match (size("cx"), size("cy")) {
            (Some(cx), Some(cy)) => Some(format!(
                "width: {}in; height: {}in",
                cx as f32 / EMUS_PER_INCH,
                cy as f32 / EMUS_PER_INCH
            )),
            _ => None,
        };

        let doc_pr = container.child(WP, "docPr");
        let alt_text = doc_pr
            .and_then(|d| d.attr("", "descr").or_else(|| d.attr("", "name")))
            .unwrap_or_default()
            .to_string();

        let rel_id = container
            .child(A, "graphic")
            .and_then(|g| g.child(A, "graphicData"))
            .and_then(|g| g.child(PIC, "pic"))
            .and_then(|p| p.child(PIC, "blipFill"))
            .and_then(|b| b.child(A, "blip"))
            .and_then(|b| b.attr(R, "embed"))?;

        let rendered = self.render_image(rel_id, node, img_style, alt_text)?;
        match href {
            Some(href) => Some(Element::new("a").attr("href", href).child(rendered).into()),
            None => Some(rendered),
        }
    }

    fn picture(&mut self, node: Node<'a>) -> Option<Markup> {
        let shape = node.child(V, "shape")?;
        let rel_id = shape.child(V, "imagedata").and_then(|d| d.attr(R, "id"))?;
        let img_style = shape.attr("", "style").and_then(|style| {
            let width = vml_size_points(style, "width")?;
            let height = vml_size_points(style, "height")?;
            Some(format!("width: {width}pt; height: {height}pt"))
        });
        self.render_image(rel_id, node, img_style, String::new())
    }
}
