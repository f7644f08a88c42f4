mod app;

use std::env;

use tiny_rasterizer::logging::{init_logging, LoggingConfig};
use tiny_rasterizer::Supersampling;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Value following a flag.
fn flag_value<'a>(args: &'a [String], i: usize) -> Result<&'a str, Box<dyn std::error::Error>> {
    return match args.get(i + 1) {
        Some(value) => Ok(value.as_str()),
        None => Err(format!("missing value after {}", args[i]).into()),
    };
}

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default());

    // Default values.
    let mut demo_name = String::from("triangle");
    let mut samples_per_pixel: Option<u32> = None;
    let mut supersampling = Supersampling::PerPixel;
    let mut output = None;
    let mut print_fps = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" => { demo_name = flag_value(&args, i)?.to_owned(); i += 1; }
            "-n" => { samples_per_pixel = Some(flag_value(&args, i)?.parse()?); i += 1; }
            "-o" => { output = Some(flag_value(&args, i)?.to_owned()); i += 1; }
            "--buffer" => { supersampling = Supersampling::Buffer; }
            "--fps" => { print_fps = true; }
            other => { log::warn!("ignoring unknown argument {}", other); }
        }
        i += 1;
    }

    let params = app::Params {
        width: WIDTH,
        height: HEIGHT,
        samples_per_pixel,
        supersampling,
        print_fps,
        demo_name,
        output,
    };

    app::run(params)?;

    return Ok(());
}
