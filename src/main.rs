use clap::{Parser, Subcommand};
use image::{DynamicImage, Rgba, RgbaImage};
use pixelfry::{Filter, FilterOutput, codec, colour};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pixelfry")]
#[command(about = "Apply chat-bot image filters to local files")]
#[command(long_about = "\
Apply chat-bot image filters to local files

Takes any raster image — PNG, JPEG, WebP, BMP, or animated GIF — and
runs it through one of the fixed filter catalogue entries. Oversized
inputs are downscaled to at most 512x512 pixels of area, and long
animations are subsampled to at most 100 frames with frame durations
rescaled so playback length is preserved.

Still inputs produce a PNG; animated inputs produce a GIF. The output
extension always matches the produced container.

Run 'pixelfry list' to see the filter catalogue.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a filter to an image file
    Filter {
        /// Input image (PNG, JPEG, WebP, BMP, or animated GIF)
        input: PathBuf,

        /// Filter name, or "random" for a uniform random choice
        #[arg(short, long, default_value = "random")]
        filter: String,

        /// Output path; defaults to <filter>.<ext> next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON report of what was applied
        #[arg(long)]
        report: bool,
    },
    /// List the available filters
    List,
    /// Show information about a colour (random when omitted)
    Colour {
        /// Hex colour value, 3 or 6 digits, leading '#' optional
        value: Option<String>,

        /// Also write a 512x512 solid swatch PNG to this path
        #[arg(long)]
        swatch: Option<PathBuf>,
    },
}

/// JSON report printed by `filter --report`.
#[derive(Serialize)]
struct FilterReport<'a> {
    filter: &'static str,
    input: ImageStats,
    output: ImageStats,
    path: &'a str,
}

#[derive(Serialize)]
struct ImageStats {
    width: u32,
    height: u32,
    frames: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Filter {
            input,
            filter,
            output,
            report,
        } => run_filter(&input, &filter, output.as_deref(), report)?,
        Command::List => {
            println!("The following filters are currently available:");
            for filter in Filter::ALL {
                println!("  {filter}");
            }
        }
        Command::Colour { value, swatch } => run_colour(value.as_deref(), swatch.as_deref())?,
    }

    Ok(())
}

fn run_filter(
    input: &Path,
    filter_name: &str,
    output: Option<&Path>,
    report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if filter_name.eq_ignore_ascii_case("random") {
        Filter::random()
    } else {
        filter_name.parse::<Filter>()?
    };

    let bytes = std::fs::read(input)?;
    let source = codec::decode(&bytes)?;
    let result = filter.apply(&source)?;
    let encoded = codec::encode(&result)?;

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            // Default: <filter>.<ext> next to the input, like a bot reply
            let name = format!("{}.{}", filter, encoded.format.extension());
            input.with_file_name(name)
        }
    };
    std::fs::write(&output_path, &encoded.bytes)?;

    if report {
        let stats = |width: u32, height: u32, frames: usize| ImageStats {
            width,
            height,
            frames,
        };
        let (in_w, in_h) = source.dimensions();
        let (out_w, out_h) = result.dimensions();
        let path = output_path.to_string_lossy();
        let report = FilterReport {
            filter: filter.name(),
            input: stats(in_w, in_h, source.frame_count()),
            output: stats(out_w, out_h, result.frame_count()),
            path: &path,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} → {}", filter, output_path.display());
    }

    Ok(())
}

fn run_colour(
    value: Option<&str>,
    swatch: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = match value {
        Some(value) => colour::ColourReport::from_hex(value)?,
        None => colour::ColourReport::new(colour::random_colour()),
    };

    println!("Hexadecimal:      #{}", report.hex);
    println!("Integer:          {}", report.integer);
    println!("RGB tuple (0-255): {:?}", report.rgb);
    println!("RGB tuple (0-1):   {:?}", report.rgb_unit);
    println!("Brightness:       {:.4}", report.brightness);
    println!("Text colour:      {}", report.text_colour);

    if let Some(path) = swatch {
        let (r, g, b) = report.rgb;
        let image = RgbaImage::from_pixel(512, 512, Rgba([r, g, b, 255]));
        let encoded = codec::encode(&FilterOutput::Still(DynamicImage::ImageRgba8(image)))?;
        std::fs::write(path, &encoded.bytes)?;
        println!("Swatch:           {}", path.display());
    }

    Ok(())
}
