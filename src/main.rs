mod cli;

use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use cli::{Cli, Command, InspectArgs, QueryArgs};
use neo_database::{
    create_filters, limit, load_approaches, load_neos, write_to_csv, write_to_json, NeoDatabase,
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_tracing(cli.verbose);

    let db = load_database(&cli.neofile, &cli.cadfile)?;

    match &cli.command {
        Command::Inspect(args) => run_inspect(&db, args),
        Command::Query(args) => run_query(&db, args),
    }
}

fn setup_tracing(verbose: bool) {
    // Logs go to stderr: stdout carries query results
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();
}

fn load_database(neofile: &Path, cadfile: &Path) -> Result<NeoDatabase> {
    let neos = load_neos(neofile)?;
    let approaches = load_approaches(cadfile)?;
    info!(neos = neos.len(), approaches = approaches.len(), "loaded data files");

    NeoDatabase::new(neos, approaches)
}

fn run_inspect(db: &NeoDatabase, args: &InspectArgs) -> Result<()> {
    let neo = match (&args.pdes, &args.name) {
        (Some(pdes), _) => db.lookup_by_designation(pdes),
        (None, Some(name)) => db.lookup_by_name(name),
        (None, None) => bail!("inspect needs --pdes or --name"),
    };

    let Some(neo) = neo else {
        println!("No matching NEOs exist in the database.");
        return Ok(());
    };

    println!("{}", neo);
    if args.approaches {
        for approach in db.approaches_of(&neo) {
            println!("- {}", approach);
        }
    }

    Ok(())
}

fn run_query(db: &NeoDatabase, args: &QueryArgs) -> Result<()> {
    let criteria = args.criteria()?;
    let filters = create_filters(&criteria);
    info!(filters = filters.len(), limit = args.limit, "running query");

    let results = limit(db.query(filters.as_slice()), Some(args.limit));

    let Some(outfile) = &args.outfile else {
        for approach in results {
            println!("{}", approach);
        }
        return Ok(());
    };

    let extension = outfile
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let written = match extension.as_deref() {
        Some("csv") => write_to_csv(results, outfile)?,
        Some("json") => write_to_json(results, outfile)?,
        _ => bail!(
            "Output file must end in .csv or .json: {}",
            outfile.display()
        ),
    };

    println!("✓ Wrote {} close approaches to {}", written, outfile.display());
    Ok(())
}
