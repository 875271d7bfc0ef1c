//! Handlebars setup for the status report.

use handlebars::{no_escape, Handlebars};
use serde::Serialize;

/// Creates the registry used to render the report.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs
}

/// Renders Markdown templates.
pub struct ReportRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders `template` with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or the template is invalid.
    pub fn render<T: Serialize>(
        &self,
        template: &str,
        data: &T,
    ) -> Result<String, super::ReportError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
