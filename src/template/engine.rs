// ABOUTME: Template engine implementation using Handlebars
// ABOUTME: Registers named prompt templates and renders them against serializable data

use handlebars::Handlebars;
use serde::Serialize;

use super::error::{Result, TemplateError};
use super::helpers;

#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with all built-in helpers
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Missing fields in a prompt are a programming error, not an empty string
        handlebars.set_strict_mode(true);

        // Prompts are plain text sent to an LLM, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        helpers::register_helpers(&mut handlebars);

        Self { handlebars }
    }

    /// Register a named template, checking its syntax
    pub fn register(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(TemplateError::SyntaxError)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Render a registered template
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        if !self.handlebars.has_template(name) {
            return Err(TemplateError::UnknownTemplate(name.to_string()));
        }
        self.handlebars
            .render(name, data)
            .map_err(TemplateError::HandlebarsError)
    }

    /// Render an ad-hoc template string
    pub fn render_template<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        self.handlebars
            .render_template(template, data)
            .map_err(TemplateError::HandlebarsError)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
