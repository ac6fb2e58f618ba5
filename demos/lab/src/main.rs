use argh::FromArgs;
use std::path::PathBuf;

use pixlab::image::Image;
use pixlab::imgproc::{
    color,
    enhance::{self, IntensityTransform},
    filter::{self, Kernel, KernelCatalog},
    fourier::{self, FilterKind, MaskCenter},
    histogram,
    parallel::WorkerPool,
    viewport::{self, Viewport},
};
use pixlab::io::functional as F;

type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(FromArgs)]
/// Image processing laboratory: apply one operation to an image and save the result
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,

    /// path to the output image
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// number of worker threads, defaults to the number of cores
    #[argh(option)]
    threads: Option<usize>,

    /// number of zoom-in steps; only the visible region is processed
    #[argh(option, default = "0")]
    zoom: u32,

    /// horizontal pan of the visible region, in pixels
    #[argh(option, default = "0.0")]
    pan_x: f64,

    /// vertical pan of the visible region, in pixels
    #[argh(option, default = "0.0")]
    pan_y: f64,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Gray(GrayArgs),
    Filter(FilterArgs),
    Equalize(EqualizeArgs),
    Tone(ToneArgs),
    Fourier(FourierArgs),
}

#[derive(FromArgs)]
/// Convert to grayscale
#[argh(subcommand, name = "gray")]
struct GrayArgs {}

#[derive(FromArgs)]
/// Convolve with a preset or a custom kernel
#[argh(subcommand, name = "filter")]
struct FilterArgs {
    /// name of a preset kernel
    #[argh(option, default = "String::from(\"Gaussian 3x3\")")]
    preset: String,

    /// path to a JSON file holding a square matrix of weights
    #[argh(option)]
    kernel_file: Option<PathBuf>,

    /// list the preset kernels and exit
    #[argh(switch)]
    list: bool,

    /// convolve the grayscale image instead of the color one
    #[argh(switch)]
    gray: bool,
}

#[derive(FromArgs)]
/// Equalize the histogram of the grayscale image
#[argh(subcommand, name = "equalize")]
struct EqualizeArgs {}

#[derive(FromArgs)]
/// Apply an intensity transformation: identity, negative, log or gamma
#[argh(subcommand, name = "tone")]
struct ToneArgs {
    /// the transformation to apply
    #[argh(positional)]
    transform: String,

    /// gain of the log and gamma transformations
    #[argh(option, default = "1.0")]
    c: f64,

    /// exponent of the gamma transformation
    #[argh(option, default = "1.0")]
    gamma: f64,
}

#[derive(FromArgs)]
/// Filter the grayscale image in the frequency domain
#[argh(subcommand, name = "fourier")]
struct FourierArgs {
    /// filter: ideal-lp, ideal-hp, butterworth-lp, butterworth-hp, gaussian-lp, gaussian-hp
    #[argh(option, default = "String::from(\"ideal-lp\")")]
    kind: String,

    /// cutoff radius in frequency bins
    #[argh(option, default = "10.0")]
    radius: f64,

    /// order of the butterworth filters
    #[argh(option, default = "2")]
    order: u32,

    /// measure column distances from the column center instead of the row center
    #[argh(switch)]
    per_axis: bool,

    /// where to save the log-magnitude spectrum
    #[argh(option)]
    spectrum: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    let args: Args = argh::from_env();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match args.threads {
        Some(num_threads) => {
            let pool = WorkerPool::new(num_threads)?;
            log::info!("running on {} worker threads", pool.num_threads());
            pool.install(|| run(&args))
        }
        None => run(&args),
    }
}

fn run(args: &Args) -> Result<(), Error> {
    if let Command::Filter(FilterArgs { list: true, .. }) = &args.command {
        for name in KernelCatalog::with_presets()?.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let (Some(input), Some(output)) = (&args.input, &args.output) else {
        return Err("both --input and --output are required".into());
    };

    let image = F::read_image_any_bgr8(input)?;
    log::info!("read {} ({})", input.display(), image.size());

    let mut view = Viewport::new(image.size());
    for _ in 0..args.zoom {
        view.zoom(true);
    }
    view.pan(args.pan_x, args.pan_y);

    let image = viewport::crop_roi(&image, &view)?;
    if args.zoom > 0 {
        log::info!("processing {:?}", view.roi());
    }

    let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0)?;
    color::gray_from_bgr_u8(&image, &mut gray)?;

    match &args.command {
        Command::Gray(_) => {
            F::write_image_gray8(output, &gray)?;
        }
        Command::Filter(filter_args) => {
            let kernel = load_kernel(filter_args)?;
            if filter_args.gray {
                let mut out = Image::<u8, 1>::from_size_val(gray.size(), 0)?;
                filter::filter2d(&gray, &mut out, &kernel)?;
                F::write_image_gray8(output, &out)?;
            } else {
                let mut out = Image::<u8, 3>::from_size_val(image.size(), 0)?;
                filter::filter2d(&image, &mut out, &kernel)?;
                F::write_image_bgr8(output, &out)?;
            }
        }
        Command::Equalize(_) => {
            let mut out = Image::<u8, 1>::from_size_val(image.size(), 0)?;
            let outcome = histogram::equalize_histogram(&gray, &mut out)?;
            log::info!("equalization: {outcome:?}");

            let mut out_bgr = Image::<u8, 3>::from_size_val(image.size(), 0)?;
            color::bgr_from_gray(&out, &mut out_bgr)?;
            F::write_image_bgr8(output, &out_bgr)?;
        }
        Command::Tone(tone_args) => {
            let transform = parse_transform(tone_args)?;
            let mut out = Image::<u8, 3>::from_size_val(image.size(), 0)?;
            enhance::apply_intensity_transform(&image, &mut out, transform)?;
            F::write_image_bgr8(output, &out)?;
        }
        Command::Fourier(fourier_args) => {
            let kind = parse_filter_kind(&fourier_args.kind, fourier_args.order)?;
            let center = if fourier_args.per_axis {
                MaskCenter::PerAxis
            } else {
                MaskCenter::SharedAxis
            };

            let spectrum = fourier::forward_transform(&gray)?;
            let mask =
                fourier::build_mask_with_center(kind, gray.size(), fourier_args.radius, center)?;

            let mut out = Image::<u8, 1>::from_size_val(gray.size(), 0)?;
            fourier::apply_mask_and_invert(&spectrum, &mask, &mut out)?;
            F::write_image_gray8(output, &out)?;

            if let Some(path) = &fourier_args.spectrum {
                let mut magnitude = Image::<u8, 1>::from_size_val(gray.size(), 0)?;
                fourier::magnitude_spectrum(&spectrum, &mut magnitude)?;
                F::write_image_gray8(path, &magnitude)?;
            }
        }
    }

    log::info!("wrote {}", output.display());

    Ok(())
}

fn load_kernel(args: &FilterArgs) -> Result<Kernel, Error> {
    if let Some(path) = &args.kernel_file {
        let text = std::fs::read_to_string(path)?;
        let rows: Vec<Vec<f32>> = serde_json::from_str(&text)?;
        return Ok(Kernel::from_rows(&rows)?);
    }

    KernelCatalog::with_presets()?
        .get(&args.preset)
        .cloned()
        .ok_or_else(|| format!("unknown preset kernel: {}", args.preset).into())
}

fn parse_transform(args: &ToneArgs) -> Result<IntensityTransform, Error> {
    let transform = match args.transform.as_str() {
        "identity" => IntensityTransform::Identity,
        "negative" => IntensityTransform::Negative,
        "log" => IntensityTransform::Logarithmic { c: args.c },
        "gamma" => IntensityTransform::Gamma {
            c: args.c,
            gamma: args.gamma,
        },
        other => return Err(format!("unknown transformation: {other}").into()),
    };
    Ok(transform)
}

fn parse_filter_kind(kind: &str, order: u32) -> Result<FilterKind, Error> {
    let kind = match kind {
        "ideal-lp" => FilterKind::IdealLowPass,
        "ideal-hp" => FilterKind::IdealHighPass,
        "butterworth-lp" => FilterKind::ButterworthLowPass { order },
        "butterworth-hp" => FilterKind::ButterworthHighPass { order },
        "gaussian-lp" => FilterKind::GaussianLowPass,
        "gaussian-hp" => FilterKind::GaussianHighPass,
        other => return Err(format!("unknown frequency filter: {other}").into()),
    };
    Ok(kind)
}
