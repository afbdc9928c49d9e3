use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;

use perfrating::categories::{all_tables, DEPARTMENTS, ENVIRONMENT_SATISFACTION, JOB_ROLES, WORK_LIFE_BALANCE};
use perfrating::model_manager::{file_sha256, verify_file, DEFAULT_MODEL};
use perfrating::{
    user_message, Classifier, Dispatcher, EmployeeProfile, FeatureField, ModelLoader, ModelManager,
    NamedFieldValues, OnnxClassifier, Optimization, RatingError, RatingReport, RuntimeConfig, FEATURE_COUNT,
    FOOTER,
};

const TITLE: &str = "Employee Performance Rating Tool";
const INTRO: &str = "A data-driven approach to analyze key factors influencing employee performance.\n\
Evaluate work-life balance, employee environment, salary hikes, experience, and managerial\n\
relationships to gain insights that improve engagement, productivity, and retention.";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the ONNX model (defaults to the models directory)
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    /// Refuse a model whose SHA-256 differs from this hex digest
    #[arg(long, global = true)]
    sha256: Option<String>,

    /// ONNX Runtime intra-op threads (0 lets the runtime decide)
    #[arg(long, global = true, default_value_t = 1)]
    threads: usize,

    /// ONNX Runtime graph optimization
    #[arg(long, global = true, value_enum, default_value_t = Optimization::All)]
    optimization: Optimization,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rate one employee from flags or a JSON profile
    Predict(PredictArgs),
    /// Fill in the form interactively
    Form,
    /// List the accepted labels and codes of the categorical fields
    Categories {
        /// Print the tables as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy an exported ONNX model into the models directory
    Install {
        /// The exported model file
        source: PathBuf,
        /// Name of the model inside the models directory
        #[arg(long, default_value = DEFAULT_MODEL)]
        name: String,
        /// Replace a model that is already installed
        #[arg(long)]
        force: bool,
    },
    /// Check an installed model's checksum and that it opens
    Verify {
        /// Name of the model inside the models directory
        #[arg(long, default_value = DEFAULT_MODEL)]
        name: String,
    },
}

#[derive(Args)]
struct PredictArgs {
    /// JSON file holding an employee profile
    #[arg(long, conflicts_with_all = [
        "department", "salary_hike", "work_life_balance", "environment_satisfaction", "job_role",
        "years_at_company", "years_in_role", "years_since_promotion", "years_with_manager",
    ])]
    profile: Option<PathBuf>,

    /// Employee department (label or code)
    #[arg(long, value_parser = parse_department)]
    department: Option<u32>,

    /// Last salary hike in percent
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    salary_hike: Option<u32>,

    /// Work-life balance (Poor, Average, Excellent)
    #[arg(long, value_parser = parse_work_life_balance)]
    work_life_balance: Option<u32>,

    /// Environment satisfaction (Poor, Average, Excellent)
    #[arg(long, value_parser = parse_environment_satisfaction)]
    environment_satisfaction: Option<u32>,

    /// Employee job role (label or code)
    #[arg(long, value_parser = parse_job_role)]
    job_role: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=40))]
    years_at_company: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=40))]
    years_in_role: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=40))]
    years_since_promotion: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=40))]
    years_with_manager: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn parse_department(s: &str) -> Result<u32, String> {
    DEPARTMENTS.resolve(s)
}

fn parse_work_life_balance(s: &str) -> Result<u32, String> {
    WORK_LIFE_BALANCE.resolve(s)
}

fn parse_environment_satisfaction(s: &str) -> Result<u32, String> {
    ENVIRONMENT_SATISFACTION.resolve(s)
}

fn parse_job_role(s: &str) -> Result<u32, String> {
    JOB_ROLES.resolve(s)
}

impl PredictArgs {
    fn fields(&self) -> anyhow::Result<NamedFieldValues> {
        if let Some(path) = &self.profile {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            let profile: EmployeeProfile = serde_json::from_str(&text)
                .with_context(|| format!("parsing profile {}", path.display()))?;
            return Ok(NamedFieldValues::from(&profile.clamped()));
        }

        let mut fields = NamedFieldValues::new();
        let flags = [
            (FeatureField::Department, self.department),
            (FeatureField::LastSalaryHikePercent, self.salary_hike),
            (FeatureField::WorkLifeBalance, self.work_life_balance),
            (FeatureField::EnvironmentSatisfaction, self.environment_satisfaction),
            (FeatureField::JobRole, self.job_role),
            (FeatureField::YearsAtCompany, self.years_at_company),
            (FeatureField::YearsInCurrentRole, self.years_in_role),
            (FeatureField::YearsSinceLastPromotion, self.years_since_promotion),
            (FeatureField::YearsWithCurrentManager, self.years_with_manager),
        ];
        for (field, value) in flags {
            if let Some(value) = value {
                fields.set(field, value);
            }
        }
        Ok(fields)
    }
}

impl Cli {
    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::default()
            .with_threads(self.threads)
            .with_optimization(self.optimization)
    }

    fn models(&self) -> anyhow::Result<ModelManager> {
        ModelManager::new_default().context("creating the models directory")
    }

    fn build_loader(&self) -> anyhow::Result<ModelLoader> {
        let path = match &self.model {
            Some(path) => path.clone(),
            None => self.models()?.get_model_path(DEFAULT_MODEL),
        };
        let loader = ModelLoader::with_runtime_config(path, self.runtime_config());
        Ok(match &self.sha256 {
            Some(hash) => loader.expect_sha256(hash.clone()),
            None => loader,
        })
    }
}

fn main() -> anyhow::Result<ExitCode> {
    perfrating::init_logger();
    let cli = Cli::parse();

    match &cli.command {
        Command::Categories { json } => {
            print_categories(*json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Predict(args) => run_predict(&cli.build_loader()?, args),
        Command::Form => run_form(&cli.build_loader()?),
        Command::Install { source, name, force } => run_install(&cli, source, name, *force),
        Command::Verify { name } => run_verify(&cli, name),
    }
}

fn print_categories(json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&all_tables())?);
        return Ok(());
    }
    for table in all_tables() {
        println!("{} (encoding v{}):", table.name, table.version);
        for (code, label) in table.entries {
            println!("  {:>2}  {}", code, label);
        }
    }
    Ok(())
}

fn run_install(cli: &Cli, source: &Path, name: &str, force: bool) -> anyhow::Result<ExitCode> {
    let models = cli.models()?;
    if models.is_model_present(name) && !force {
        eprintln!(
            "Model '{}' is already installed at {}; pass --force to replace it.",
            name,
            models.get_model_path(name).display()
        );
        return Ok(ExitCode::FAILURE);
    }
    if let Some(expected) = &cli.sha256 {
        if !verify_file(source, expected)? {
            eprintln!("{} does not match the expected SHA-256 {}", source.display(), expected);
            return Ok(ExitCode::FAILURE);
        }
    }

    let target = models.install_model(name, source)?;
    match OnnxClassifier::from_file(&target, &cli.runtime_config()) {
        Ok(classifier) => {
            println!("Installed '{}' at {}", name, target.display());
            println!("  features: {}", classifier.expected_arity());
            println!("  sha256:   {}", file_sha256(&target)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            models.remove_model(name)?;
            eprintln!("{}", user_message(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_verify(cli: &Cli, name: &str) -> anyhow::Result<ExitCode> {
    let models = cli.models()?;
    if !models.is_model_present(name) {
        eprintln!("Model '{}' is not installed; use the install command first.", name);
        return Ok(ExitCode::FAILURE);
    }

    let path = models.get_model_path(name);
    match &cli.sha256 {
        Some(expected) => {
            if !models.verify_model(name, expected)? {
                eprintln!("Checksum mismatch for {}: expected {}", path.display(), expected);
                return Ok(ExitCode::FAILURE);
            }
            println!("Checksum OK");
        }
        None => println!("sha256: {}", file_sha256(&path)?),
    }

    match OnnxClassifier::from_file(&path, &cli.runtime_config()) {
        Ok(classifier) if classifier.expected_arity() == FEATURE_COUNT => {
            println!("Model opens and expects {} features.", FEATURE_COUNT);
            Ok(ExitCode::SUCCESS)
        }
        Ok(classifier) => {
            let mismatch = RatingError::FeatureMismatch {
                expected: classifier.expected_arity(),
                actual: FEATURE_COUNT,
            };
            eprintln!("{}", user_message(&mismatch));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("{}", user_message(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_predict(loader: &ModelLoader, args: &PredictArgs) -> anyhow::Result<ExitCode> {
    let fields = args.fields()?;
    let handle = match loader.load() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{}", user_message(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut dispatcher = Dispatcher::new(handle);
    match dispatcher.submit(&fields) {
        Ok(report) => {
            print_report(&report, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", user_message(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_report(report: &RatingReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
        println!("{}", FOOTER);
    }
    Ok(())
}

fn run_form(loader: &ModelLoader) -> anyhow::Result<ExitCode> {
    println!("{}\n\n{}\n", TITLE, INTRO);

    let handle = match loader.load() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{}", user_message(&e));
            println!("\n{}", FOOTER);
            return Ok(ExitCode::FAILURE);
        }
    };
    let mut dispatcher = Dispatcher::new(handle);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut fields = NamedFieldValues::new();

    println!("Enter Employee Details (press Enter to keep the current value)");
    loop {
        for field in FeatureField::ALL {
            let current = fields.get(field).unwrap_or(0);
            match prompt_field(&mut input, field, current)? {
                Some(value) => {
                    fields.set(field, value);
                }
                None => return Ok(ExitCode::SUCCESS),
            }
        }

        loop {
            let menu = "\n[p]redict performance rating, [e]dit, [r]eload model, [q]uit > ";
            let Some(action) = prompt(&mut input, menu)? else {
                return Ok(ExitCode::SUCCESS);
            };
            match action.to_ascii_lowercase().as_str() {
                "p" | "predict" | "" => {
                    println!("\n{}", dispatcher.submit_and_render(&fields));
                }
                "e" | "edit" => break,
                "r" | "reload" => match loader.reload() {
                    Ok(handle) => {
                        dispatcher.set_handle(handle);
                        println!("Model reloaded.");
                    }
                    Err(e) => eprintln!("{}", user_message(&e)),
                },
                "q" | "quit" => {
                    println!("\n{}", FOOTER);
                    return Ok(ExitCode::SUCCESS);
                }
                other => println!("Unknown action '{}'", other),
            }
        }
    }
}

/// Reads one trimmed line, `None` on end of input.
fn prompt(input: &mut impl BufRead, text: &str) -> io::Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Asks for one field until a usable value is given. Numbers are clamped to
/// the field's range, categorical fields take a label or a code.
fn prompt_field(input: &mut impl BufRead, field: FeatureField, current: u32) -> io::Result<Option<u32>> {
    if let Some(table) = field.categories() {
        let options: Vec<String> = table
            .entries
            .iter()
            .map(|(code, label)| format!("{}={}", code, label))
            .collect();
        println!("  [{}]", options.join(", "));
    }

    loop {
        let range = field.range();
        let text = format!("{} ({}-{}) [{}]: ", field.prompt(), range.start(), range.end(), current);
        let Some(answer) = prompt(input, &text)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(Some(current));
        }

        let parsed = match field.categories() {
            Some(table) => table.resolve(&answer),
            None => answer
                .parse::<u32>()
                .map(|value| field.clamp(value))
                .map_err(|_| format!("'{}' is not a whole number", answer)),
        };
        match parsed {
            Ok(value) => {
                info!("{} = {}", field, value);
                return Ok(Some(value));
            }
            Err(message) => println!("  {}", message),
        }
    }
}
