//! `cvu resolve` — Resolve the effective view for an item type.

use std::path::PathBuf;

use clap::Args;
use cvu_cascade::{CvuEngine, RenderTarget};
use cvu_common::config::CvuConfig;
use cvu_expr::{Arguments, Value};

use super::parse_json;
use crate::output;

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Item type, e.g. `Person`, or `*`.
    pub type_name: String,

    /// Resolve the list view (`Type[]`) instead of the single-item view.
    #[arg(short, long)]
    pub list: bool,

    /// Renderer to use instead of the one the definitions name.
    #[arg(short, long)]
    pub renderer: Option<String>,

    /// Named view placed above every other definition.
    #[arg(long)]
    pub session_view: Option<String>,

    /// Directory of default definitions (overrides the configuration).
    #[arg(long)]
    pub defaults: Option<PathBuf>,

    /// Directory of user definitions (overrides the configuration).
    #[arg(long)]
    pub user: Option<PathBuf>,

    /// JSON object of view arguments.
    #[arg(long, default_value = "{}")]
    pub args: String,

    /// Render group to resolve for `--item`, e.g. `*`.
    #[arg(long, requires = "item")]
    pub render: Option<String>,

    /// JSON item to render.
    #[arg(long)]
    pub item: Option<String>,
}

/// Executes the `resolve` command.
///
/// Loads the default and user directories, builds the cascade for the
/// requested type and prints every effective property as JSON. With
/// `--render`, also prints the resolved element tree for the item.
///
/// # Errors
///
/// Returns an error if loading fails, the JSON is invalid, or a property
/// or render group cannot be resolved.
pub fn execute(args: ResolveArgs, mut config: CvuConfig) -> anyhow::Result<()> {
    if let Some(dir) = args.defaults {
        config.defaults_dir = dir;
    }
    if let Some(dir) = args.user {
        config.user_dir = dir;
    }

    let mut engine = CvuEngine::new(config);
    engine.load()?;
    for diagnostic in engine.diagnostics() {
        tracing::warn!(
            domain = %diagnostic.domain,
            file = %diagnostic.name,
            "skipped definition file:\n{}",
            diagnostic.message
        );
    }

    let mut target = if args.list {
        RenderTarget::list(args.type_name)
    } else {
        RenderTarget::single(args.type_name)
    };
    if let Some(renderer) = args.renderer {
        target = target.with_renderer(renderer);
    }
    if let Some(view) = args.session_view {
        target = target.with_session_view(view);
    }

    let arguments = Arguments::from_json(parse_json("--args", &args.args)?);
    let mut view = engine.view(&target, arguments);
    println!("renderer: {}", view.renderer_name());
    println!("{}", output::properties_json(&view.resolved_properties()?)?);

    if let (Some(group), Some(item)) = (args.render, args.item) {
        let item = Value::from_json(parse_json("--item", &item)?);
        let tree = view.render_config().render(&group, item, &Arguments::new())?;
        println!();
        print!("{}", output::format_tree(&tree));
    }
    Ok(())
}
