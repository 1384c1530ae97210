use anyhow::Result;
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use cli::driver::{self, CheckReport, ParseReport};
use cli::resolve_bundle;
use frontend::parser::ParseError;
use kernel::diagnostics::Severity;

#[derive(Parser, Debug)]
#[command(version, about = "Type-check LaTeX math expressions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse an expression and print the term and its normal form
    Parse {
        /// LaTeX source, e.g. "\forall x \in \mathbb{N}, x \geq 0"
        expression: String,

        /// Emit a machine-readable report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Parse and type-check an expression
    Check {
        /// LaTeX source of the statement to check
        expression: String,

        /// Axiom bundle to check against: 'classical' or 'minimal'
        #[arg(long, default_value = "classical")]
        bundle: String,

        /// Emit a machine-readable report instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let outcome = match run(&cli) {
        Ok(ok) => ok,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };
    if !outcome {
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Commands::Parse { expression, json } => {
            let (term, normal, errors) = driver::parse_only(expression);
            if *json {
                let report = ParseReport {
                    input: expression.clone(),
                    term: term.to_string(),
                    normal_form: normal.to_string(),
                    parse_errors: errors.iter().map(Into::into).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render_parse_errors(expression, &errors);
                println!("term: {}", term);
                println!("whnf: {}", normal);
            }
            Ok(errors.is_empty())
        }
        Commands::Check {
            expression,
            bundle,
            json,
        } => {
            let bundle = resolve_bundle(bundle)?;
            let outcome = driver::check_expression(expression, bundle);
            if *json {
                let report = CheckReport::new(expression, &outcome);
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(outcome.succeeded());
            }
            render_parse_errors(expression, &outcome.parse_errors);
            println!("term: {}", outcome.term);
            for diag in &outcome.result.diagnostics {
                println!("{}: {}", diag.severity, diag.message);
            }
            for hole in &outcome.result.holes {
                println!("hole ?{}:", hole.id);
                for suggestion in &hole.suggestions {
                    println!("  suggestion: {}", suggestion);
                }
            }
            if !outcome.result.axioms_used.is_empty() {
                let names: Vec<&str> = outcome
                    .result
                    .axioms_used
                    .iter()
                    .map(|a| a.name())
                    .collect();
                println!("axioms used: {}", names.join(", "));
            }
            let verdict = if outcome.result.has_errors()
                || !outcome.parse_errors.is_empty()
            {
                "invalid"
            } else if outcome
                .result
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Warning)
            {
                "valid with warnings"
            } else {
                "valid"
            };
            println!("verdict: {}", verdict);
            Ok(outcome.succeeded())
        }
    }
}

fn render_parse_errors(source: &str, errors: &[ParseError]) {
    for error in errors {
        let span = error.span();
        let result = Report::build(ReportKind::Error, "<input>", span.start)
            .with_message(error.to_string())
            .with_label(
                Label::new(("<input>", span.start..span.end))
                    .with_message(error.to_string())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint(("<input>", Source::from(source)));
        if result.is_err() {
            eprintln!("parse error: {}", error);
        }
    }
}
