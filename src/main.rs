use std::io::{self, Read};

use clap::{Args, Parser as ClapParser, Subcommand};
use cms_filter::cli::{self, CliError, CompilerOptions};
use tracing::debug;

#[derive(ClapParser)]
#[command(name = "cmsfilter")]
#[command(about = "Compile content filter expressions into PostgreSQL and SQLite WHERE clauses")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CompilerArgs {
    /// Target dialect or driver name (pgsql, sqlite)
    #[arg(short, long, env = "CMSFILTER_DIALECT", default_value = "pgsql")]
    dialect: String,

    /// Builtin column alias, e.g. published=n.published (repeatable)
    #[arg(short, long = "builtin")]
    builtins: Vec<String>,

    /// JSON file with an object of builtin name -> column
    #[arg(long = "builtins")]
    builtins_file: Option<String>,

    /// Placeholder prefix
    #[arg(long, env = "CMSFILTER_PREFIX")]
    prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a filter expression
    Compile {
        /// The filter expression (reads from stdin if not provided)
        query: Option<String>,

        #[command(flatten)]
        compiler: CompilerArgs,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Compile an order-by statement
    Order {
        /// The order-by statement (reads from stdin if not provided)
        statement: Option<String>,

        #[command(flatten)]
        compiler: CompilerArgs,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'cmsfilter docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            query,
            compiler,
            pretty,
        } => run_compile(query, compiler, pretty),
        Commands::Order {
            statement,
            compiler,
        } => run_order(statement, compiler),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        // 2 for invalid queries, 1 for everything else
        std::process::exit(if e.is_query_error() { 2 } else { 1 });
    }
}

fn read_input(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end().to_string())
        }
        None => Err(CliError::NoInput),
    }
}

fn compiler_options(args: CompilerArgs) -> Result<CompilerOptions, CliError> {
    let builtins_json = match args.builtins_file {
        Some(path) => {
            debug!(%path, "loading builtins");
            Some(std::fs::read_to_string(path)?)
        }
        None => None,
    };

    Ok(CompilerOptions {
        dialect: args.dialect,
        builtins: args.builtins,
        builtins_json,
        prefix: args.prefix,
    })
}

fn run_compile(query: Option<String>, args: CompilerArgs, pretty: bool) -> Result<(), CliError> {
    let query = read_input(query)?;
    let options = compiler_options(args)?;
    let output = cli::execute_compile(&options, &query)?;

    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}

fn run_order(statement: Option<String>, args: CompilerArgs) -> Result<(), CliError> {
    let statement = read_input(statement)?;
    let options = compiler_options(args)?;

    println!("{}", cli::execute_order(&options, &statement)?);

    Ok(())
}
