use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use retire::api::{AppState, run_http_server};
use retire::core::{CalculatorInputs, RealEstateMode, ValuationBasis, compute};
use retire::report::render_text;
use retire::store::{JsonFilePlanStore, MemoryPlanStore, PlanStore};

#[derive(Parser, Debug)]
#[command(
    name = "retire",
    about = "Retirement funding projection: required funds, projected assets and the gap"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve(ServeArgs),
    /// Project one plan and print the result.
    Compute(ComputeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "RETIRE_PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, env = "RETIRE_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,
    #[arg(
        long,
        env = "RETIRE_STORE",
        help = "JSON file holding saved plans; plans live in memory when omitted"
    )]
    store: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRealEstateMode {
    Keep,
    Sell,
    Rent,
}

impl From<CliRealEstateMode> for RealEstateMode {
    fn from(value: CliRealEstateMode) -> Self {
        match value {
            CliRealEstateMode::Keep => RealEstateMode::Keep,
            CliRealEstateMode::Sell => RealEstateMode::Sell,
            CliRealEstateMode::Rent => RealEstateMode::Rent,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliValuationBasis {
    Real,
    Nominal,
}

impl From<CliValuationBasis> for ValuationBasis {
    fn from(value: CliValuationBasis) -> Self {
        match value {
            CliValuationBasis::Real => ValuationBasis::Real,
            CliValuationBasis::Nominal => ValuationBasis::Nominal,
        }
    }
}

/// Every flag takes the same free text a form field would, so `"1,200,000"`
/// and `"-1.5"` are both accepted as written.
#[derive(Args, Debug, Default)]
struct ComputeArgs {
    #[arg(long, help = "Start from a JSON file of inputs; flags override its fields")]
    input: Option<PathBuf>,
    #[arg(long, help = "Print the outputs as JSON instead of a text report")]
    json: bool,

    #[arg(long)]
    current_age: Option<String>,
    #[arg(long)]
    retire_age: Option<String>,
    #[arg(long)]
    life_expectancy: Option<String>,
    #[arg(long)]
    monthly_expense: Option<String>,
    #[arg(long)]
    monthly_saving: Option<String>,
    #[arg(long, help = "Pension or other fixed monthly income after retirement")]
    fixed_income: Option<String>,
    #[arg(long)]
    cash: Option<String>,
    #[arg(long)]
    investments: Option<String>,
    #[arg(long)]
    real_estate_value: Option<String>,
    #[arg(long)]
    mortgage_balance: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Annual mortgage rate in percent")]
    mortgage_rate: Option<String>,
    #[arg(long)]
    mortgage_years: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Return before retirement in percent")]
    pre_return: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Return after retirement in percent")]
    post_return: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Annual inflation in percent")]
    inflation: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Real estate appreciation in percent")]
    appreciation: Option<String>,
    #[arg(long, help = "Extra spending in the last ten years, in percent")]
    medical_boost: Option<String>,
    #[arg(long, value_enum)]
    mode: Option<CliRealEstateMode>,
    #[arg(long, help = "Transaction cost of a sale in percent of the sale value")]
    sell_cost: Option<String>,
    #[arg(long)]
    sale_age: Option<String>,
    #[arg(long)]
    rent_income: Option<String>,
    #[arg(long)]
    rent_start_age: Option<String>,
    #[arg(long, value_enum)]
    basis: Option<CliValuationBasis>,
}

fn overlay(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn build_inputs(args: ComputeArgs) -> Result<CalculatorInputs, String> {
    let mut inputs = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<CalculatorInputs>(&text)
                .map_err(|e| format!("invalid inputs in {}: {e}", path.display()))?
        }
        None => CalculatorInputs::default(),
    };

    overlay(&mut inputs.current_age, args.current_age);
    overlay(&mut inputs.retire_age, args.retire_age);
    overlay(&mut inputs.life_expectancy, args.life_expectancy);
    overlay(&mut inputs.monthly_expense, args.monthly_expense);
    overlay(&mut inputs.monthly_saving, args.monthly_saving);
    overlay(&mut inputs.post_retirement_fixed_income, args.fixed_income);
    overlay(&mut inputs.cash, args.cash);
    overlay(&mut inputs.investments, args.investments);
    overlay(&mut inputs.real_estate_value, args.real_estate_value);
    overlay(&mut inputs.mortgage_balance, args.mortgage_balance);
    overlay(&mut inputs.mortgage_annual_rate_pct, args.mortgage_rate);
    overlay(&mut inputs.mortgage_years_remaining, args.mortgage_years);
    overlay(&mut inputs.pre_retirement_return_pct, args.pre_return);
    overlay(&mut inputs.post_retirement_return_pct, args.post_return);
    overlay(&mut inputs.inflation_pct, args.inflation);
    overlay(&mut inputs.real_estate_appreciation_pct, args.appreciation);
    overlay(&mut inputs.medical_late_boost_pct, args.medical_boost);
    overlay(&mut inputs.sell_cost_rate_pct, args.sell_cost);
    overlay(&mut inputs.sale_age, args.sale_age);
    overlay(&mut inputs.rent_net_monthly_income, args.rent_income);
    overlay(&mut inputs.rent_start_age, args.rent_start_age);
    if let Some(mode) = args.mode {
        inputs.mode = mode.into();
    }
    if let Some(basis) = args.basis {
        inputs.valuation_basis = basis.into();
    }
    Ok(inputs)
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("retire=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn serve(args: ServeArgs) -> std::io::Result<()> {
    let store: Arc<dyn PlanStore> = match &args.store {
        Some(path) => {
            info!(path = %path.display(), "saving plans to file");
            Arc::new(JsonFilePlanStore::new(path))
        }
        None => {
            info!("saving plans in memory only");
            Arc::new(MemoryPlanStore::new())
        }
    };
    let addr = SocketAddr::new(args.bind, args.port);
    run_http_server(addr, AppState::new(store)).await
}

fn run_compute(args: ComputeArgs) -> Result<(), String> {
    let as_json = args.json;
    let inputs = build_inputs(args)?;
    let outputs = compute(&inputs);

    if as_json {
        let json = serde_json::to_string_pretty(&outputs)
            .map_err(|e| format!("cannot encode outputs: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", render_text(&outputs));
    }

    match outputs.failure {
        Some(reason) => Err(reason),
        None => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            if let Err(e) = serve(args).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Compute(args) => {
            if let Err(e) = run_compute(args) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse_compute(args: &[&str]) -> ComputeArgs {
        let mut argv = vec!["retire", "compute"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Command::Compute(args) => args,
            Command::Serve(_) => panic!("expected compute subcommand"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compute_flags_keep_raw_text() {
        let args = parse_compute(&[
            "--current-age",
            "35",
            "--monthly-expense",
            "30,000",
            "--inflation",
            "-1.5",
            "--mode",
            "sell",
            "--basis",
            "nominal",
        ]);
        let inputs = build_inputs(args).expect("valid inputs");
        assert_eq!(inputs.current_age, "35");
        assert_eq!(inputs.monthly_expense, "30,000");
        assert_eq!(inputs.inflation_pct, "-1.5");
        assert_eq!(inputs.mode, RealEstateMode::Sell);
        assert_eq!(inputs.valuation_basis, ValuationBasis::Nominal);
        assert_eq!(inputs.cash, "");
    }

    #[test]
    fn flags_override_input_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("inputs.json");
        fs::write(
            &path,
            r#"{"currentAge": "30", "retireAge": "60", "cash": "100"}"#,
        )
        .expect("write inputs");

        let mut args = parse_compute(&["--retire-age", "65"]);
        args.input = Some(path);
        let inputs = build_inputs(args).expect("valid inputs");
        assert_eq!(inputs.current_age, "30");
        assert_eq!(inputs.retire_age, "65");
        assert_eq!(inputs.cash, "100");
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let args = ComputeArgs {
            input: Some(PathBuf::from("/nonexistent/retire-inputs.json")),
            ..ComputeArgs::default()
        };
        let err = build_inputs(args).expect_err("must fail");
        assert!(err.contains("cannot read"));
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::parse_from(["retire", "serve"]);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bind, IpAddr::from([0, 0, 0, 0]));
                assert!(args.port > 0);
            }
            Command::Compute(_) => panic!("expected serve subcommand"),
        }
    }
}
