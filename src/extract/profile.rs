use crate::config::MarkupConfig;
use crate::ConfigError;
use scraper::Selector;

/// Compiled selectors for the target site's markup
///
/// Built once per run from [`MarkupConfig`]; building it is also how the
/// configuration's selectors get validated.
#[derive(Debug, Clone)]
pub struct MarkupProfile {
    pub(crate) results_container_id: String,
    pub(crate) results_container_token: String,
    pub(crate) termination_marker: String,
    pub(crate) full_row_class: String,
    pub(crate) excluded_full_row_labels: Vec<String>,

    pub(crate) with_id: Selector,
    pub(crate) any_link: Selector,
    pub(crate) any_image: Selector,

    pub(crate) item: Selector,
    pub(crate) post_container: Selector,
    pub(crate) title: Selector,
    pub(crate) gallery_image: Selector,
    pub(crate) pagination: Selector,
    pub(crate) next_page: Selector,

    pub(crate) price: Selector,
    pub(crate) description: Selector,
    pub(crate) field: Selector,
    pub(crate) field_label: Selector,
    pub(crate) field_value: Selector,
    pub(crate) wide_value: Selector,
    pub(crate) full_row_item: Selector,
}

impl MarkupProfile {
    /// Compiles every selector of a markup configuration
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidSelector` naming the first setting that does not
    /// parse as a CSS selector.
    pub fn from_config(config: &MarkupConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            results_container_id: config.results_container_id.clone(),
            results_container_token: config.results_container_token.clone(),
            termination_marker: config.termination_marker.clone(),
            full_row_class: config.full_row_class.clone(),
            excluded_full_row_labels: config.excluded_full_row_labels.clone(),

            with_id: compile("id", "[id]")?,
            any_link: compile("link", "a[href]")?,
            any_image: compile("image", "img")?,

            item: compile("item", &config.item)?,
            post_container: compile("post-container", &config.post_container)?,
            title: compile("title", &config.title)?,
            gallery_image: compile("gallery-image", &config.gallery_image)?,
            pagination: compile("pagination", &config.pagination)?,
            next_page: compile("next-page", &config.next_page)?,

            price: compile("price", &config.price)?,
            description: compile("description", &config.description)?,
            field: compile("field", &config.field)?,
            field_label: compile("field-label", &config.field_label)?,
            field_value: compile("field-value", &config.field_value)?,
            wide_value: compile("wide-value", &config.wide_value)?,
            full_row_item: compile("full-row-item", &config.full_row_item)?,
        })
    }

    /// The profile for the default markup configuration
    pub fn standard() -> Result<Self, ConfigError> {
        Self::from_config(&MarkupConfig::default())
    }

    /// Returns true if a label must never come from the full-row pass
    pub(crate) fn is_excluded_full_row_label(&self, label: &str) -> bool {
        self.excluded_full_row_labels
            .iter()
            .any(|excluded| excluded.trim().eq_ignore_ascii_case(label.trim()))
    }
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        field,
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
