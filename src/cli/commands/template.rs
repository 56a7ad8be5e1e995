//! Template commands
//!
//! `render` and `vars` work on a single template string.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, warn};

use crate::cli::input::{load_context, split_prefix};
use crate::template::Template;

/// Substitute every span of `template` and print the result
pub fn run_render_command(template: &str, context: Option<&Path>, lossy: bool) -> Result<()> {
    let context = load_context(context)?;
    let template = Template::parse(template);
    debug!(segments = template.segments().len(), lossy, "Rendering template");

    let output = if lossy {
        let (output, errors) = template.render_lossy(&context);
        for failure in &errors {
            warn!("Kept '{}' at {}: {}", failure.raw, failure.offset, failure);
        }
        output
    } else {
        template.render(&context)?
    };

    println!("{}", output);
    Ok(())
}

/// Print the variables `template` reads, one per line
pub fn run_vars_command(template: &str, prefix: Option<&str>) -> Result<()> {
    let prefix = split_prefix(prefix);
    for name in Template::parse(template).variables(prefix.as_slice())? {
        println!("{}", name);
    }
    Ok(())
}
