use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use orifice_beta::orifice::{BETA_MAX, BETA_MIN, SAMPLE_COUNT};
use orifice_beta::report::{render_curve, render_summary, write_curve_csv};
use orifice_beta::{
    BetaRange, FileSink, InputError, LogSink, SearchForm, SearchRequest, SearchSink, Session,
};

/// Finds the orifice diameter ratio (beta) that delivers a desired volumetric flow.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pipe internal diameter D [m]
    #[arg(long, default_value = "0.1")]
    diameter: String,

    /// Discharge coefficient C
    #[arg(long, default_value = "0.6")]
    coefficient: String,

    /// Differential pressure across the plate [Pa]
    #[arg(long, default_value = "5000")]
    differential: String,

    /// Fluid density [kg/m3]
    #[arg(long, default_value = "1000")]
    density: String,

    /// Desired volumetric flow [m3/s]
    #[arg(long, default_value = "0.002")]
    flow: String,

    /// Accepted absolute deviation from the desired flow
    #[arg(long, default_value = "1e-6")]
    tolerance: String,

    /// Number of beta samples.
    #[arg(long, default_value_t = SAMPLE_COUNT)]
    samples: usize,

    /// Smallest beta sampled.
    #[arg(long, default_value_t = BETA_MIN)]
    beta_min: f64,

    /// Largest beta sampled.
    #[arg(long, default_value_t = BETA_MAX)]
    beta_max: f64,

    /// Retry up to N times with doubled tolerance while no beta is found.
    #[arg(long, default_value_t = 0)]
    relax: u32,

    /// Append-only audit log.
    #[arg(long, default_value = "beta_search.log")]
    log_file: PathBuf,

    /// Write the sampled curve as CSV.
    #[arg(long)]
    curve: Option<PathBuf>,

    /// Verbose. Prints a preview table of the sampled curve.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn form(&self) -> SearchForm {
        SearchForm {
            pipe_diameter: self.diameter.clone(),
            discharge_coefficient: self.coefficient.clone(),
            pressure_differential: self.differential.clone(),
            fluid_density: self.density.clone(),
            desired_flow: self.flow.clone(),
            tolerance: self.tolerance.clone(),
        }
    }

    fn request(&self) -> Result<SearchRequest, InputError> {
        let range = BetaRange::new(self.beta_min, self.beta_max)?;
        Ok(self
            .form()
            .parse()?
            .with_beta_range(range)
            .with_sample_count(self.samples)?)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    info!(" [!] Parsed arguments.");

    let request = match args.request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Input error: {e}");
            eprintln!("Please enter valid numeric values.");
            return ExitCode::from(2);
        }
    };

    let file_sink: Option<Box<dyn SearchSink>> = match FileSink::open(&args.log_file) {
        Ok(sink) => Some(Box::new(sink)),
        Err(e) => {
            error!("audit log {} unavailable: {e}", args.log_file.display());
            None
        }
    };
    let mut session = Session::new((LogSink, file_sink));

    let mut current = request.clone();
    let mut result = session.run(request);
    println!("{}", render_summary(&current, &result));

    for attempt in 1..=args.relax {
        if result.is_found() {
            break;
        }
        let Some((relaxed, relaxed_result)) = session.relax() else {
            break;
        };
        println!("Retry {attempt}: tolerance widened to {}", relaxed.tolerance);
        println!("{}", render_summary(&relaxed, &relaxed_result));
        current = relaxed;
        result = relaxed_result;
    }

    if args.verbose {
        println!("{}", render_curve(&result, 20));
    }

    if let Some(path) = &args.curve {
        let written = File::create(path)
            .and_then(|file| write_curve_csv(BufWriter::new(file), &current, &result));
        match written {
            Ok(()) => info!(" [!] Curve written to {}.", path.display()),
            Err(e) => {
                eprintln!("Could not write curve to {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
