//! `cvu eval` — Evaluate an expression against JSON arguments.

use clap::Args;
use cvu_expr::{Arguments, Expression, MemoryHost, Value};

use super::parse_json;

/// Arguments for the `eval` command.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Expression source, e.g. `.age > 18 ? 'adult' : 'minor'`.
    pub expression: String,

    /// Treat the input as interpolated text, e.g. `Hello {.name}`.
    #[arg(short, long)]
    pub string_mode: bool,

    /// JSON object of named arguments.
    #[arg(long, default_value = "{}")]
    pub args: String,

    /// JSON value bound as the current item (`.`).
    #[arg(long)]
    pub item: Option<String>,

    /// Print the parsed tree instead of evaluating.
    #[arg(long)]
    pub ast: bool,
}

/// Executes the `eval` command.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or the expression fails to
/// parse or evaluate.
pub fn execute(args: EvalArgs) -> anyhow::Result<()> {
    let expression = if args.string_mode {
        Expression::string_mode(args.expression)
    } else {
        Expression::new(args.expression)
    };

    if args.ast {
        let ast = expression.ast().map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("{ast}");
        return Ok(());
    }

    let mut arguments = Arguments::from_json(parse_json("--args", &args.args)?);
    if let Some(item) = &args.item {
        arguments = arguments.with_item(Value::from_json(parse_json("--item", item)?));
    }

    let value = expression.evaluate(&MemoryHost::new(), &arguments)?;
    println!("{}", serde_json::to_string_pretty(&value.to_json())?);
    Ok(())
}
