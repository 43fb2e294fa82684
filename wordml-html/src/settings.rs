//! Conversion settings.

use crate::markup::Markup;
use crate::measure::MetricsSource;
use crate::normalize::numbering::ListItemImplementations;
use crate::transform::image::ImageInfo;
use std::fmt;
use std::rc::Rc;

/// Turns a decoded image into markup, or declines it with `None`.
pub type ImageHandler = Rc<dyn Fn(&ImageInfo<'_>) -> Option<Markup>>;

pub const DEFAULT_GENERAL_CSS: &str = "span { white-space: pre-wrap; }";

#[derive(Clone)]
pub struct ConvertSettings {
    /// Contents of the `title` element.
    pub page_title: String,
    /// Prefix of fabricated class names.
    pub css_class_prefix: String,
    /// Collect declarations into classes; otherwise write `style` attributes.
    pub fabricate_css_classes: bool,
    pub general_css: String,
    pub additional_css: String,
    pub restrict_to_supported_languages: bool,
    pub restrict_to_supported_numbering_formats: bool,
    /// Render insertions, deletions and moves; otherwise accept them.
    pub display_revision_tracking: bool,
    pub display_comments: bool,
    /// Show comments as hover balloons next to their initials instead of
    /// collecting them at the end of the document.
    pub display_comments_as_balloon: bool,
    pub list_items: ListItemImplementations,
    /// Images are dropped when no handler is set.
    pub image_handler: Option<ImageHandler>,
    pub metrics: MetricsSource,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            page_title: String::new(),
            css_class_prefix: "pt-".to_string(),
            fabricate_css_classes: true,
            general_css: DEFAULT_GENERAL_CSS.to_string(),
            additional_css: String::new(),
            restrict_to_supported_languages: false,
            restrict_to_supported_numbering_formats: false,
            display_revision_tracking: true,
            display_comments: true,
            display_comments_as_balloon: false,
            list_items: ListItemImplementations::default(),
            image_handler: None,
            metrics: MetricsSource::default(),
        }
    }
}

impl ConvertSettings {
    pub fn with_image_handler(
        mut self,
        handler: impl Fn(&ImageInfo<'_>) -> Option<Markup> + 'static,
    ) -> Self {
        self.image_handler = Some(Rc::new(handler));
        self
    }
}

impl fmt::Debug for ConvertSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertSettings")
            .field("page_title", &self.page_title)
            .field("css_class_prefix", &self.css_class_prefix)
            .field("fabricate_css_classes", &self.fabricate_css_classes)
            .field("general_css", &self.general_css)
            .field("additional_css", &self.additional_css)
            .field(
                "restrict_to_supported_languages",
                &self.restrict_to_supported_languages,
            )
            .field(
                "restrict_to_supported_numbering_formats",
                &self.restrict_to_supported_numbering_formats,
            )
            .field("display_revision_tracking", &self.display_revision_tracking)
            .field("display_comments", &self.display_comments)
            .field("display_comments_as_balloon", &self.display_comments_as_balloon)
            .field("list_items", &self.list_items)
            .field("image_handler", &self.image_handler.is_some())
            .field("metrics", &self.metrics)
            .finish()
    }
}
