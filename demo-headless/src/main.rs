use chrono::NaiveDate;
use clap::Parser;
use fertiplan_core::balance::ApplicationStage;
use fertiplan_core::{
    CalculationRequest, CalculationResult, EngineConfig, FertilizerEngine,
    GeospatialContext, Nutrient, RngJitter, TimingRecommendation, WeatherSnapshot,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fertilizer plan and timing demo
#[derive(Parser, Debug)]
#[command(name = "fertiplan-demo")]
#[command(about = "Rice / wheat fertilizer recommendation demo", long_about = None)]
struct Args {
    /// Directory with soil rasters and regional GeoJSON layers
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Crop (rice, wheat, 水稻, 小麦)
    #[arg(short, long, default_value = "rice")]
    crop: String,

    /// Target yield in kg/mu
    #[arg(short = 'y', long = "yield", default_value_t = 500.0)]
    target_yield: f64,

    /// Field longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Field latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Sowing date (YYYY-MM-DD)
    #[arg(short, long)]
    sowing_date: Option<String>,

    /// Soil test N (mg/kg)
    #[arg(long)]
    soil_n: Option<f64>,

    /// Soil test P2O5 (mg/kg)
    #[arg(long)]
    soil_p: Option<f64>,

    /// Soil test K2O (mg/kg)
    #[arg(long)]
    soil_k: Option<f64>,

    /// Soil organic matter (g/kg)
    #[arg(long)]
    organic_matter: Option<f64>,

    /// Soil pH
    #[arg(long)]
    ph: Option<f64>,

    /// Fresh straw returned (kg/mu)
    #[arg(long)]
    straw: Option<f64>,

    /// Forecast temperature around basal application (°C)
    #[arg(short, long, allow_hyphen_values = true)]
    temperature: Option<f64>,

    /// Weather snapshot JSON; enables timing advice
    #[arg(short, long)]
    weather: Option<PathBuf>,

    /// Date to advise for (defaults to today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// JSON array of requests to evaluate in parallel instead of the flags above
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// Seed for the simulated soil fallback
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn request(&self) -> CalculationRequest {
        let mut request = CalculationRequest::new(self.crop.clone(), self.target_yield);
        if let (Some(lon), Some(lat)) = (self.lon, self.lat) {
            request = request.with_location(lon, lat);
        }
        if let Some(date) = &self.sowing_date {
            request = request.with_sowing_date(date.clone());
        }
        if self.soil_n.is_some() || self.soil_p.is_some() || self.soil_k.is_some() {
            request = request.with_custom_soil(self.soil_n, self.soil_p, self.soil_k);
        }
        if let Some(om) = self.organic_matter {
            request = request.with_organic_matter(om);
        }
        if let Some(ph) = self.ph {
            request = request.with_soil_ph(ph);
        }
        if let Some(straw) = self.straw {
            request = request.with_straw_return(straw);
        }
        if let Some(t) = self.temperature {
            request = request.with_temperature_forecast(t);
        }
        request
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    let context = match &args.data_dir {
        Some(dir) => GeospatialContext::load_dir(dir).map_err(|e| e.to_string())?,
        None => {
            info!("No data directory given, soil will be simulated or defaulted");
            GeospatialContext::empty()
        }
    };
    let engine = FertilizerEngine::new(config, context);

    if let Some(path) = &args.batch {
        return run_batch(&engine, path, args.seed, args.json);
    }

    let request = args.request();
    let mut jitter = RngJitter::new(StdRng::seed_from_u64(args.seed));
    let result = engine
        .calculate(&request, &mut jitter)
        .map_err(|e| e.to_string())?;

    let timing = match &args.weather {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            let snapshot: WeatherSnapshot = serde_json::from_str(&text)
                .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
            let today = args
                .today
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            Some(engine.advise_timing(result.crop, args.sowing_date.as_deref(), today, &snapshot))
        }
        None => None,
    };

    if args.json {
        let output = serde_json::json!({ "plan": result, "timing": timing });
        let text = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        print_plan(&result);
        if let Some(timing) = &timing {
            print_timing(timing);
        }
    }
    Ok(())
}

fn run_batch(
    engine: &FertilizerEngine,
    path: &Path,
    seed: u64,
    json: bool,
) -> Result<(), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let requests: Vec<CalculationRequest> = serde_json::from_str(&text)
        .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
    info!("Evaluating {} requests", requests.len());

    let results = engine.calculate_batch(&requests, seed);

    if json {
        let output: Vec<serde_json::Value> = results
            .iter()
            .map(|r| match r {
                Ok(plan) => serde_json::json!({ "plan": plan }),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            })
            .collect();
        let text = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    println!("  # | Crop  | Yield | Urea  | SSP   | KCl   | Soil");
    println!("----|-------|-------|-------|-------|-------|---------");
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(plan) => println!(
                "{:3} | {:5} | {:5.0} | {:5.1} | {:5.1} | {:5.1} | {}",
                i,
                plan.crop.as_str(),
                plan.target_yield,
                plan.totals.urea,
                plan.totals.superphosphate,
                plan.totals.potassium_chloride,
                if plan.soil.is_default { "estimated" } else { "measured" }
            ),
            Err(e) => println!("{i:3} | error: {e}"),
        }
    }
    Ok(())
}

fn print_plan(result: &CalculationResult) {
    println!("=== Fertilizer Plan ===\n");
    println!(
        "Crop: {}, target yield {:.0} kg/mu",
        result.crop.display_name(),
        result.target_yield
    );

    println!("\nSoil (mg/kg):");
    for nutrient in Nutrient::ALL {
        println!(
            "  {:5} {:7.1}  {:9} {:?}",
            nutrient.symbol(),
            result.soil.values.get(nutrient),
            result.soil.level.get(nutrient).label(),
            result.soil.source.get(nutrient)
        );
    }

    println!("\nNutrient | Demand | Soil  | Straw | Required | Efficiency");
    println!("---------|--------|-------|-------|----------|-----------");
    for (nutrient, b) in result.nutrients.iter() {
        println!(
            "{:8} | {:6.1} | {:5.1} | {:5.1} | {:8.1} | {:.2}",
            nutrient.symbol(),
            b.demand,
            b.soil_supply,
            b.straw_supply,
            b.required,
            b.efficiency
        );
    }

    println!(
        "\nSplit ({:?} sowing{}): base {:.2}, mid {:.2}, late {:.2}",
        result.split.regime,
        if result.split.cold_adjusted { ", cold adjusted" } else { "" },
        result.split.base,
        result.split.mid,
        result.split.late
    );

    println!("\nStage                  | Urea  | SSP   | KCl");
    println!("-----------------------|-------|-------|------");
    for stage in ApplicationStage::ALL {
        if let Some(s) = result.stage(stage) {
            println!(
                "{:22} | {:5.1} | {:5.1} | {:5.1}",
                s.label, s.products.urea, s.products.superphosphate, s.products.potassium_chloride
            );
        }
    }
    println!(
        "{:22} | {:5.1} | {:5.1} | {:5.1}",
        "Total",
        result.totals.urea,
        result.totals.superphosphate,
        result.totals.potassium_chloride
    );

    if let Some(note) = &result.sowing_window {
        println!("\n{note}");
    }
    if !result.guidance.is_empty() {
        println!("\nNotes:");
        for note in &result.guidance {
            println!("  - {note}");
        }
    }
}

fn print_timing(timing: &TimingRecommendation) {
    println!("\n=== Timing ===\n");
    match timing.days_since_sowing {
        Some(days) => println!("Stage: {} (day {})", timing.stage, days),
        None => println!("Stage: {}", timing.stage),
    }
    println!("{}", timing.stage_description);
    println!(
        "Weather risk: {} (rain {}, temperature {})",
        timing.weather.level, timing.weather.rain_risk, timing.weather.temperature_risk
    );
    println!(
        "Fertilize today: {}",
        if timing.can_fertilize { "yes" } else { "no" }
    );
    if let Some(day) = timing.next_window {
        println!("Next suitable day: {day}");
    }
    println!("Best timing: {}", timing.best_timing);
    for line in &timing.advice {
        println!("  - {line}");
    }
}
