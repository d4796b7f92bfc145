// ABOUTME: Template engine module for planner prompts
// ABOUTME: Provides Handlebars rendering of the planning and recovery prompts

pub mod engine;
pub mod error;
pub mod helpers;

pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
