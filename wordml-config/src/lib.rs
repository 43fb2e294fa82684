//! Shared configuration loader for the wordml toolchain.
//!
//! `defaults/wordml.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`WordmlConfig`],
//! which converts into the library's [`ConvertSettings`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use wordml_html::{inline_image_handler, ConvertSettings, MetricsSource, MonospaceMetrics};

const DEFAULT_TOML: &str = include_str!("../defaults/wordml.default.toml");

/// Top-level configuration consumed by wordml applications.
#[derive(Debug, Clone, Deserialize)]
pub struct WordmlConfig {
    pub html: HtmlConfig,
    pub revisions: RevisionsConfig,
    pub comments: CommentsConfig,
    pub restrictions: RestrictionsConfig,
    pub measurement: MeasurementConfig,
    pub images: ImagesConfig,
}

/// Output document and stylesheet knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    pub page_title: String,
    pub css_class_prefix: String,
    pub fabricate_css_classes: bool,
    pub general_css: String,
    pub additional_css: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevisionsConfig {
    pub display: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsConfig {
    pub display: bool,
    pub as_balloon: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestrictionsConfig {
    pub supported_languages_only: bool,
    pub supported_numbering_formats_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementConfig {
    pub mode: MeasurementMode,
    pub em_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MeasurementMode {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "approximate")]
    Approximate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub embed: bool,
}

impl From<&MeasurementConfig> for MetricsSource {
    fn from(config: &MeasurementConfig) -> Self {
        match config.mode {
            MeasurementMode::System => MetricsSource::System,
            MeasurementMode::Approximate => MetricsSource::Monospace(MonospaceMetrics {
                em_fraction: config.em_fraction,
            }),
        }
    }
}

impl From<&WordmlConfig> for ConvertSettings {
    fn from(config: &WordmlConfig) -> Self {
        let settings = ConvertSettings {
            page_title: config.html.page_title.clone(),
            css_class_prefix: config.html.css_class_prefix.clone(),
            fabricate_css_classes: config.html.fabricate_css_classes,
            general_css: config.html.general_css.clone(),
            additional_css: config.html.additional_css.clone(),
            restrict_to_supported_languages: config.restrictions.supported_languages_only,
            restrict_to_supported_numbering_formats: config
                .restrictions
                .supported_numbering_formats_only,
            display_revision_tracking: config.revisions.display,
            display_comments: config.comments.display,
            display_comments_as_balloon: config.comments.as_balloon,
            metrics: MetricsSource::from(&config.measurement),
            ..ConvertSettings::default()
        };
        if config.images.embed {
            settings.with_image_handler(inline_image_handler)
        } else {
            settings
        }
    }
}

impl From<WordmlConfig> for ConvertSettings {
    fn from(config: WordmlConfig) -> Self {
        ConvertSettings::from(&config)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<WordmlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<WordmlConfig, ConfigError> {
    Loader::new().build()
}
