use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use dk_app::{AppResult, project_service};
use dk_project::StreamFormat;
use dk_results::{AssemblyOptions, FailurePolicy, ResultSetAssembler, batch_to_node};
use dk_value::{GenericNode, Value, decode, encode};

#[derive(Parser)]
#[command(name = "dk-cli")]
#[command(about = "DEVS kit CLI - experiment editing and result reconstruction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List conditions, or the ports of one condition
    Conditions {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Condition whose ports to list
        condition: Option<String>,
    },
    /// Show the values of a condition port as JSON
    Show {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        condition: String,
        port: String,
    },
    /// Create an empty condition
    CreateCondition {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        condition: String,
    },
    /// Append a JSON value to a condition port, creating the port if needed
    AddValue {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        condition: String,
        port: String,
        /// Value as JSON (e.g. 1.5, "text", [1, 2], {"a": true})
        json: String,
    },
    /// List outputs and their plugins
    Outputs {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Point an output at a plugin
    SetPlugin {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        output: String,
        #[arg(long)]
        plugin: String,
        #[arg(long)]
        package: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Stream format: "local" or "distant"
        #[arg(long, default_value = "local")]
        format: String,
    },
    /// Show the experiment, or update its begin, duration and seed
    Experiment {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        #[arg(long)]
        begin: Option<f64>,
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rebuild result trees from a JSON dump of raw engine output
    Reconstruct {
        /// JSON file holding a result set (or a result list with --batch)
        input: PathBuf,
        /// Input is a replicate grid of result sets
        #[arg(long)]
        batch: bool,
        /// What to do with a column that cannot be rebuilt
        #[arg(long, value_enum, default_value_t = PolicyArg::Fail)]
        on_column_error: PolicyArg,
        /// What to do with a view that cannot be rebuilt
        #[arg(long, value_enum, default_value_t = PolicyArg::Fail)]
        on_view_error: PolicyArg,
        /// Output JSON file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a JSON-dumped value into its generic tree
    Encode {
        input: PathBuf,
    },
    /// Convert a generic JSON tree into a typed value
    Decode {
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fail,
    Skip,
    Null,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Fail => FailurePolicy::Fail,
            PolicyArg::Skip => FailurePolicy::Skip,
            PolicyArg::Null => FailurePolicy::Null,
        }
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Conditions {
            project_path,
            condition,
        } => cmd_conditions(&project_path, condition.as_deref()),
        Commands::Show {
            project_path,
            condition,
            port,
        } => cmd_show(&project_path, &condition, &port),
        Commands::CreateCondition {
            project_path,
            condition,
        } => cmd_create_condition(&project_path, &condition),
        Commands::AddValue {
            project_path,
            condition,
            port,
            json,
        } => cmd_add_value(&project_path, &condition, &port, &json),
        Commands::Outputs { project_path } => cmd_outputs(&project_path),
        Commands::SetPlugin {
            project_path,
            output,
            plugin,
            package,
            location,
            format,
        } => cmd_set_plugin(&project_path, &output, &plugin, &package, &location, &format),
        Commands::Experiment {
            project_path,
            begin,
            duration,
            seed,
        } => cmd_experiment(&project_path, begin, duration, seed),
        Commands::Reconstruct {
            input,
            batch,
            on_column_error,
            on_view_error,
            output,
        } => {
            let options = AssemblyOptions {
                on_column_error: on_column_error.into(),
                on_view_error: on_view_error.into(),
            };
            cmd_reconstruct(&input, batch, options, output.as_deref())
        }
        Commands::Encode { input } => cmd_encode(&input),
        Commands::Decode { input } => cmd_decode(&input),
    }
}

fn cmd_conditions(project_path: &Path, condition: Option<&str>) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    match condition {
        None => {
            let names = project.condition_list();
            if names.is_empty() {
                println!("No conditions found in project");
            }
            for name in names {
                println!("  {}", name);
            }
        }
        Some(condition) => {
            for port in project.condition_port_list(condition)? {
                let count = project.condition_get_setvalue(condition, port)?.len();
                println!("  {} ({} values)", port, count);
            }
        }
    }
    Ok(())
}

fn cmd_show(project_path: &Path, condition: &str, port: &str) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let node = project_service::condition_show(&project, condition, port)?;
    println!("{}", serde_json::to_string_pretty(&node)?);
    Ok(())
}

fn cmd_create_condition(project_path: &Path, condition: &str) -> AppResult<()> {
    let mut project = project_service::load_project(project_path)?;
    project.condition_create(condition)?;
    project_service::save_project(project_path, &project)?;
    println!("✓ Created condition {}", condition);
    Ok(())
}

fn cmd_add_value(project_path: &Path, condition: &str, port: &str, json: &str) -> AppResult<()> {
    let node: GenericNode = serde_json::from_str(json)?;
    let mut project = project_service::load_project(project_path)?;
    project_service::condition_add_node(&mut project, condition, port, &node)?;
    project_service::save_project(project_path, &project)?;
    println!("✓ Added value to {}.{}", condition, port);
    Ok(())
}

fn cmd_outputs(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    if project.outputs.is_empty() {
        println!("No outputs found in project");
    }
    for name in project.outputs_list() {
        let output = project.output(name)?;
        println!(
            "  {} -> {}/{} ({:?}, location '{}')",
            output.name, output.package, output.plugin, output.format, output.location
        );
    }
    Ok(())
}

fn cmd_set_plugin(
    project_path: &Path,
    output: &str,
    plugin: &str,
    package: &str,
    location: &str,
    format: &str,
) -> AppResult<()> {
    let mut project = project_service::load_project(project_path)?;
    project.output_set_plugin(
        output,
        location,
        StreamFormat::from_name(format),
        plugin,
        package,
    )?;
    project_service::save_project(project_path, &project)?;
    println!("✓ Output {} now uses {}/{}", output, package, plugin);
    Ok(())
}

fn cmd_experiment(
    project_path: &Path,
    begin: Option<f64>,
    duration: Option<f64>,
    seed: Option<u64>,
) -> AppResult<()> {
    let mut project = project_service::load_project(project_path)?;
    let changed = begin.is_some() || duration.is_some() || seed.is_some();

    if let Some(begin) = begin {
        project.set_begin(begin)?;
    }
    if let Some(duration) = duration {
        project.set_duration(duration)?;
    }
    if let Some(seed) = seed {
        project.set_seed(seed);
    }
    if changed {
        project_service::save_project(project_path, &project)?;
    }

    println!("Experiment: {}", project.experiment.name);
    println!("  begin    = {}", project.begin());
    println!("  duration = {}", project.duration());
    println!("  seed     = {}", project.seed());
    Ok(())
}

fn cmd_reconstruct(
    input: &Path,
    batch: bool,
    options: AssemblyOptions,
    output: Option<&Path>,
) -> AppResult<()> {
    let value = read_json::<Value>(input)?;
    let assembler = ResultSetAssembler::new(options);

    let tree = if batch {
        batch_to_node(assembler.reconstruct_batch(&value)?)
    } else {
        GenericNode::Mapping(assembler.reconstruct(&value)?)
    };

    let content = serde_json::to_string_pretty(&tree)?;
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            println!("✓ Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn cmd_encode(input: &Path) -> AppResult<()> {
    let value = read_json::<Value>(input)?;
    let node = encode(&value)?;
    println!("{}", serde_json::to_string_pretty(&node)?);
    Ok(())
}

fn cmd_decode(input: &Path) -> AppResult<()> {
    let node = read_json::<GenericNode>(input)?;
    match decode(&node) {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => {
            tracing::warn!(input = %input.display(), "tree decodes to no value");
            println!("null");
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
