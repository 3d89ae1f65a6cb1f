use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use recourse_model::{
    parse_count, run, Error, InputError, Instance, InstanceGenerator, Results, SimplexBackend, Table,
    DEFAULT_SCENARIOS,
};
use recourse_solver::Solver;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recourse")]
#[command(about = "Two-stage stochastic parts ordering under demand uncertainty", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate (or load) an instance, solve it, and print the plan
    Solve {
        /// Number of sites; prompted for when omitted
        #[arg(short = 'm', long)]
        sites: Option<String>,
        /// Number of warehouses; prompted for when omitted
        #[arg(short = 'n', long)]
        warehouses: Option<String>,
        /// Seed for instance generation
        #[arg(short, long)]
        seed: Option<u64>,
        /// Solve an instance read from a JSON file instead of generating one
        #[arg(short, long, conflicts_with_all = ["sites", "warehouses", "seed"])]
        instance: Option<PathBuf>,
        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Also print orders and leftover inventory
        #[arg(short, long)]
        all: bool,
        /// Simplex pivot budget
        #[arg(long, default_value_t = 50_000)]
        max_iterations: usize,
    },
    /// Generate an instance and write it as JSON
    Generate {
        /// Number of sites
        #[arg(short = 'm', long)]
        sites: String,
        /// Number of warehouses
        #[arg(short = 'n', long)]
        warehouses: String,
        /// Seed for instance generation
        #[arg(short, long)]
        seed: Option<u64>,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check an instance file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            sites,
            warehouses,
            seed,
            instance,
            format,
            all,
            max_iterations,
        } => {
            if format != "pretty" && format != "json" {
                eprintln!("Unknown format: {} (expected pretty or json)", format);
                std::process::exit(2);
            }

            let instance = match instance {
                Some(path) => read_instance(&path),
                None => {
                    let sites = count_or_prompt("sites", sites, "Enter the number of sites (m): ");
                    let warehouses = count_or_prompt("warehouses", warehouses, "Enter the number of warehouse (n): ");
                    generate(sites, warehouses, seed)
                }
            };

            let backend = SimplexBackend::with_solver(Solver::new().with_max_iterations(max_iterations));
            let results = match run(&instance, &backend) {
                Ok(r) => r,
                Err(e) => fail(e),
            };

            if format == "json" {
                match serde_json::to_string_pretty(&results) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing results: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_results(&results, all);
            }
        }
        Commands::Generate {
            sites,
            warehouses,
            seed,
            output,
        } => {
            let sites = parse_count("sites", &sites).unwrap_or_else(|e| fail(e.into()));
            let warehouses = parse_count("warehouses", &warehouses).unwrap_or_else(|e| fail(e.into()));
            let instance = generate(sites, warehouses, seed);

            let json = match serde_json::to_string_pretty(&instance) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Error serializing instance: {}", e);
                    std::process::exit(1);
                }
            };
            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        eprintln!("Error writing {}: {}", path.display(), e);
                        std::process::exit(1);
                    }
                    tracing::info!(path = %path.display(), "instance written");
                }
                None => println!("{}", json),
            }
        }
        Commands::Check { file } => {
            let instance = read_instance(&file);
            match instance.validate() {
                Ok(()) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} sites", instance.num_sites());
                    println!("  {} warehouses", instance.num_warehouses());
                    println!("  {} scenarios", instance.num_scenarios());
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn fail(error: Error) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}

/// Uses the flag value when given, otherwise asks on the console
fn count_or_prompt(name: &'static str, given: Option<String>, prompt: &str) -> usize {
    let raw = match given {
        Some(raw) => raw,
        None => {
            print!("{}", prompt);
            let _ = io::stdout().flush();
            let mut line = String::new();
            if let Err(e) = io::stdin().lock().read_line(&mut line) {
                eprintln!("Error reading {}: {}", name, e);
                std::process::exit(1);
            }
            line
        }
    };
    parse_count(name, &raw).unwrap_or_else(|e: InputError| fail(e.into()))
}

fn generate(sites: usize, warehouses: usize, seed: Option<u64>) -> Instance {
    let mut generator = match seed {
        Some(seed) => InstanceGenerator::new(seed),
        None => InstanceGenerator::from_entropy(),
    };
    generator
        .generate(sites, warehouses, DEFAULT_SCENARIOS)
        .unwrap_or_else(|e| fail(e.into()))
}

fn read_instance(path: &Path) -> Instance {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_results(results: &Results, all: bool) {
    println!("Objective Value: {}", results.objective_value);

    if all {
        println!();
        println!("The number of parts to be ordered:");
        println!("  {:<14} {:>10}", results.orders.index_set, "level");
        for (site, x) in results.orders.iter() {
            println!("  {:<14} {:>10.4}", site, x);
        }
        println!();
        println!("The number of parts left in inventory:");
        print_table(&results.inventory);
    }

    println!();
    println!("The number of units produced:");
    print_table(&results.production);
}

fn print_table(table: &Table) {
    println!("  {:<14} {:<12} {:>10}", table.row_set, table.column_set, "level");
    for (row, column, value) in table.iter() {
        println!("  {:<14} {:<12} {:>10.4}", row, column, value);
    }
}
