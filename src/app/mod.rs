use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use qfilter::{
    AddOutcome, ComparisonOperator, add_item, normalize_expression, parse_filter, remove_item,
};

use crate::config::FiltersConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Attribute definitions file (YAML)
    #[arg(short, long, global = true, env = "QFILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the structured view of an expression as JSON
    Parse {
        expression: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Rewrite an expression in canonical form
    Normalize { expression: String },

    /// Add a filter item to an expression
    Add {
        #[command(flatten)]
        item: ItemArgs,

        /// Replace existing equality items of the attribute
        #[arg(long)]
        replace: bool,

        /// Current expression (empty if omitted)
        #[arg(default_value = "")]
        expression: String,
    },

    /// Remove a filter item from an expression
    Remove {
        #[command(flatten)]
        item: ItemArgs,

        expression: String,
    },
}

#[derive(Args)]
pub struct ItemArgs {
    /// Attribute id, e.g. status or build.user.username
    #[arg(short, long = "attr")]
    pub attribute: String,

    /// Canonical value; prefix with ! to negate, `null` for a null check
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,

    /// Operator token or name (==, !=, =like=, =notlike=, =isnull=, equal, like, ...)
    #[arg(short, long)]
    pub operator: Option<ComparisonOperator>,
}

/// Execute the selected command and return what should be printed.
pub fn run(cli: &Cli, config: &FiltersConfig) -> Result<String> {
    match &cli.command {
        Command::Parse { expression, pretty } => {
            let parsed = parse_filter(expression);
            let json = if *pretty {
                serde_json::to_string_pretty(&parsed)
            } else {
                serde_json::to_string(&parsed)
            };
            json.context("CLI: Failed to render parsed filter as JSON")
        }
        Command::Normalize { expression } => Ok(normalize_expression(expression)),
        Command::Add {
            item,
            replace,
            expression,
        } => {
            let (operator, replace) = config.resolve(&item.attribute, item.operator, *replace);
            let outcome = add_item(
                &item.attribute,
                item.value.as_str(),
                operator,
                expression,
                replace,
            )
            .with_context(|| format!("CLI: Cannot add filter on '{}'", item.attribute))?;

            match outcome {
                AddOutcome::Changed(updated) => Ok(updated),
                AddOutcome::Duplicate => {
                    tracing::info!(
                        "Filter {}{}{} already present; expression unchanged",
                        item.attribute,
                        operator,
                        item.value
                    );
                    Ok(expression.clone())
                }
            }
        }
        Command::Remove { item, expression } => {
            let (operator, _) = config.resolve(&item.attribute, item.operator, false);
            Ok(remove_item(
                &item.attribute,
                item.value.as_str(),
                operator,
                expression,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttributeConfig;

    fn run_args(args: &[&str], config: &FiltersConfig) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("qfilter").chain(args.iter().copied()))?;
        run(&cli, config)
    }

    #[test]
    fn test_add_uses_default_operator() {
        let output = run_args(
            &["add", "--attr", "status", "--value", "SUCCESS"],
            &FiltersConfig::default(),
        )
        .unwrap();
        assert_eq!(output, "(status==SUCCESS)");
    }

    #[test]
    fn test_add_uses_configured_operator() {
        let config = FiltersConfig {
            default_operator: ComparisonOperator::Equal,
            attributes: vec![AttributeConfig {
                id: "name".into(),
                operator: Some(ComparisonOperator::Like),
                single_select: false,
            }],
        };
        let output = run_args(&["add", "--attr", "name", "--value", "x"], &config).unwrap();
        assert_eq!(output, "(name=like=\"%x%\")");
    }

    #[test]
    fn test_add_duplicate_echoes_input() {
        let output = run_args(
            &["add", "-a", "status", "--value", "A", "(status==A)"],
            &FiltersConfig::default(),
        )
        .unwrap();
        assert_eq!(output, "(status==A)");
    }

    #[test]
    fn test_add_mixed_operator_fails() {
        let err = run_args(
            &["add", "-a", "status", "--value", "A", "-o", "=like=", "(status==B)"],
            &FiltersConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_remove_command() {
        let output = run_args(
            &["remove", "-a", "status", "--value", "A", "(status==A,status==B)"],
            &FiltersConfig::default(),
        )
        .unwrap();
        assert_eq!(output, "(status==B)");
    }

    #[test]
    fn test_parse_command_json() {
        let output = run_args(&["parse", "(status==A,status==B)"], &FiltersConfig::default())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["status"]["operator"], "equal");
        assert_eq!(json["status"]["logicalOperator"], "or");
        assert_eq!(json["status"]["values"], serde_json::json!(["A", "B"]));
    }

    #[test]
    fn test_invalid_operator_rejected() {
        let result = run_args(
            &["add", "-a", "status", "--value", "A", "-o", "=gt="],
            &FiltersConfig::default(),
        );
        assert!(result.is_err());
    }
}
