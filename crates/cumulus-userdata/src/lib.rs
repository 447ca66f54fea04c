//! Cloud-init user data resolution
//!
//! Renders the user data template against the merged variable set and
//! combines the result with any raw user data supplied directly. Rendering
//! is strict: referencing an undefined variable is a render error, not an
//! empty substitution.

pub mod error;

pub use error::{Result, UserDataError};

use cumulus_config::{Config, Section, SectionMap};
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

/// The template file configured for this run, if any.
pub fn template_path(config: &Config) -> Option<PathBuf> {
    config
        .get_str(Section::UserDataTemplate, "file")
        .map(PathBuf::from)
}

/// Merge the variable sources used to render the template.
///
/// Precedence, lowest first: `common` section, `template_variables` section,
/// CLI-supplied raw override map.
pub fn merge_template_variables(
    config: &Config,
    cli_override: Option<&SectionMap>,
) -> SectionMap {
    let mut variables = config.common.clone();
    variables.extend(
        config
            .template_variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    if let Some(map) = cli_override {
        variables.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    variables
}

/// Render a template file with the given variables.
pub fn render_template(path: &Path, variables: &SectionMap) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| UserDataError::TemplateLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let context = Context::from_serialize(variables).map_err(|e| UserDataError::TemplateRender {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut tera = Tera::default();
    tera.render_str(&content, &context)
        .map_err(|e| UserDataError::TemplateRender {
            path: path.to_path_buf(),
            message: render_error_detail(&e),
        })
}

/// Combine a rendered template with raw user data.
///
/// Both present: rendered first, raw appended. One present: that one.
/// Neither: empty string.
pub fn combine(rendered: Option<String>, raw: Option<String>) -> String {
    match (rendered, raw) {
        (Some(rendered), Some(raw)) => {
            tracing::debug!("combining rendered template with raw user data");
            rendered + &raw
        }
        (Some(rendered), None) => rendered,
        (None, Some(raw)) => raw,
        (None, None) => String::new(),
    }
}

/// Produce the final user data payload for a run.
pub fn resolve_user_data(config: &Config, cli_variables: Option<&SectionMap>) -> Result<String> {
    let rendered = match template_path(config) {
        Some(path) => {
            let variables = merge_template_variables(config, cli_variables);
            Some(render_template(&path, &variables)?)
        }
        None => None,
    };

    let raw = config.get_str(Section::Compute, "user_data");
    Ok(combine(rendered, raw))
}

// Tera nests the useful message in the error source chain.
fn render_error_detail(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
