//! msql: derive SQL for data-access methods
//!
//! # Usage
//!
//! ```bash
//! # Plan every method of a mapper description
//! msql generate user_mapper.json
//!
//! # Show what a method name derives to
//! msql explain FindByBirthdayGTE --table user
//!
//! # Compile named placeholders
//! msql compile "select * from user where id = :id" --dialect postgres
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use msql::prelude::*;
use msql::transpiler::column_name;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "msql")]
#[command(version)]
#[command(about = "Derive SQL, bind arguments and scan targets for data-access methods", long_about = None)]
#[command(after_help = "EXAMPLES:
    msql explain FindByBirthdayGTE --table user
    msql compile 'select * from user where id = :id' --dialect postgres
    msql columns 'select u.*, a.phone from user u join address a on u.id = a.user_id'
    msql generate user_mapper.json --format json")]
struct Cli {
    /// Config file (defaults to ./msql.toml, then the user config dir)
    #[arg(short, long, global = true, env = "MSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan every method of a mapper description (JSON)
    Generate {
        mapper: PathBuf,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Parse a method name and show the SQL it derives to
    Explain {
        identifier: String,

        #[arg(short, long)]
        dialect: Option<String>,

        #[arg(short, long, default_value = "table")]
        table: String,
    },
    /// Rewrite :name placeholders into positional ones
    Compile {
        sql: String,

        #[arg(short, long)]
        dialect: Option<String>,
    },
    /// Show the statement kind and projected columns
    Columns {
        sql: String,

        #[arg(short, long)]
        dialect: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    init_tracing(cli.verbose)?;
    let config = GeneratorConfig::load(cli.config.as_deref()).context("loading config")?;

    match &cli.command {
        Commands::Generate { mapper, format } => generate(mapper, format, config),
        Commands::Explain {
            identifier,
            dialect,
            table,
        } => explain(identifier, resolve_dialect(dialect, &config)?, table),
        Commands::Compile { sql, dialect } => compile(sql, resolve_dialect(dialect, &config)?),
        Commands::Columns { sql, dialect } => columns(sql, resolve_dialect(dialect, &config)?),
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose { "msql=debug" } else { "msql=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn resolve_dialect(name: &Option<String>, config: &GeneratorConfig) -> Result<Dialect> {
    let dialect = match name {
        Some(name) => Dialect::from_name(name)?,
        None => config.default_dialect()?,
    };
    Ok(dialect)
}

fn generate(path: &Path, format: &OutputFormat, config: GeneratorConfig) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mapper: MapperDecl = serde_json::from_str(&content)
        .with_context(|| format!("parsing mapper description {}", path.display()))?;

    let generator = Generator::new(config);
    let plan = generator.plan_mapper(&mapper);

    match format {
        OutputFormat::Json => print_plan_json(&plan)?,
        OutputFormat::Table => print_plan_table(&plan, &generator.config().scan_item),
    }

    let failed = plan.failures().count();
    if failed > 0 {
        anyhow::bail!("{} of {} method(s) failed", failed, plan.methods.len());
    }
    Ok(())
}

fn print_plan_table(plan: &MapperPlan, item: &str) {
    println!(
        "{} {} {}",
        plan.mapper.cyan().bold(),
        "→".dimmed(),
        plan.table.white()
    );
    println!();

    for result in &plan.methods {
        match &result.plan {
            Ok(Some(MethodPlan::Select(select))) => {
                println!("{} {}", "SELECT".green().bold(), result.method.white().bold());
                println!("  {} {}", "SQL: ".dimmed(), select.sql.white());
                println!("  {} {}", "Args:".dimmed(), render_args(&select.args).yellow());
                println!("  {} {}", "Scan:".dimmed(), select.scan.render(item).cyan());
                if select.master {
                    println!("  {} {}", "Route:".dimmed(), "master".magenta());
                }
            }
            Ok(Some(MethodPlan::Delete(delete))) => {
                println!("{} {}", "DELETE".green().bold(), result.method.white().bold());
                println!("  {} {}", "SQL: ".dimmed(), delete.sql.white());
                println!("  {} {}", "Args:".dimmed(), render_args(&delete.args).yellow());
            }
            Ok(None) => {
                println!("{} {}", "SKIP".dimmed(), result.method.dimmed());
            }
            Err(e) => {
                println!("{} {}", "FAIL".red().bold(), result.method.white().bold());
                println!("  {}", e.to_string().red());
            }
        }
    }
}

fn render_args(args: &ArgumentList) -> String {
    if args.positional {
        format!("{} (positional)", args.render())
    } else {
        args.render()
    }
}

fn print_plan_json(plan: &MapperPlan) -> Result<()> {
    let methods: Vec<serde_json::Value> = plan
        .methods
        .iter()
        .map(|result| match &result.plan {
            Ok(Some(method_plan)) => json!({ "method": result.method, "plan": method_plan }),
            Ok(None) => json!({ "method": result.method, "plan": null }),
            Err(e) => json!({ "method": result.method, "error": e.to_string() }),
        })
        .collect();

    let output = json!({
        "mapper": plan.mapper,
        "table": plan.table,
        "methods": methods,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn explain(identifier: &str, dialect: Dialect, table: &str) -> Result<()> {
    println!("{} {}", "Identifier:".dimmed(), identifier.yellow());
    println!();

    let Some(query) = msql::parse(identifier)? else {
        println!(
            "{}",
            "No query derivable: the name does not start with find, count, exists or delete"
                .yellow()
        );
        return Ok(());
    };

    println!("{}", "Parsed Intent:".green().bold());
    println!("  {} {}", "Subject:".dimmed(), query.subject().to_string().cyan());

    // Name placeholders after their columns so the SQL reads naturally
    let mut names = Vec::new();
    if let Some(group) = query.filter_group() {
        println!("  {}", "Predicates:".dimmed());
        for predicate in group.predicates() {
            println!("    • {} {:?}", predicate.field.white(), predicate.op);
            let column = column_name(&predicate.field);
            match predicate.op.arity() {
                0 => {}
                1 => names.push(column),
                _ => {
                    names.push(format!("{}_from", column));
                    names.push(format!("{}_to", column));
                }
            }
        }
    }

    let query = query
        .with_table(Table::new(table))
        .fill_named_args(names.as_slice())?;
    let sql = Translator::for_dialect(dialect).translate(&query)?;

    println!();
    println!("{} ({})", "Generated SQL:".green().bold(), dialect);
    println!("  {}", sql.white());
    Ok(())
}

fn compile(sql: &str, dialect: Dialect) -> Result<()> {
    let bound = compile_named_query(sql, dialect)?;

    println!("{} ({})", "Compiled SQL:".green().bold(), dialect);
    println!("  {}", bound.sql.white());
    if bound.has_placeholders() {
        println!();
        println!("{}", "Bindings:".cyan());
        for (i, name) in bound.names.iter().enumerate() {
            println!("  {} = {}", dialect.bind_style().placeholder(i + 1), name.yellow());
        }
    }
    Ok(())
}

fn columns(sql: &str, dialect: Dialect) -> Result<()> {
    let statement = Statement::parse(dialect, sql)?;

    println!("{} {:?}", "Kind:".dimmed(), statement.kind());
    if statement.kind() != StatementKind::Select {
        return Ok(());
    }

    println!("{}", "Columns:".green().bold());
    for column in statement.select_columns()? {
        if column.qualifier.is_empty() {
            println!("  • {}", column.alias.white());
        } else {
            println!("  • {}.{}", column.qualifier.dimmed(), column.alias.white());
        }
    }
    Ok(())
}
