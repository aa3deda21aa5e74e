use std::path::PathBuf;

use deblur::{display, engine, noise, BlurOperator, Config, Image, NoiseParams};
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "deblur",
    about = "Simulating optical blur and recovering the image by deconvolution"
)]
struct Opt {
    /// Path to the run configuration file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opt = Opt::from_args();
    let config = Config::load(opt.config)?;
    run(&config)?;
    Ok(())
}

fn run(config: &Config) -> Result<(), deblur::Error> {
    let image = Image::load(&config.input_image, config.color)?;
    let psf = config.psf()?;
    let kernel = psf.kernel(config.n)?;
    info!(
        "{} PSF, {}-tap kernel over a {}x{} {} image",
        psf,
        config.n,
        image.height(),
        image.width(),
        if config.color { "RGB" } else { "grayscale" }
    );

    let row_op = BlurOperator::new(&kernel, image.height())?;
    let col_op = BlurOperator::new(&kernel, image.width())?;
    info!(
        "operator condition numbers: rows {:.3e}, columns {:.3e}",
        row_op.condition_number(),
        col_op.condition_number()
    );

    let mut blurred = engine::blur(&image, &row_op, &col_op)?;
    if config.add_noise {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let params = NoiseParams {
            mean: config.mean,
            variance: config.var,
        };
        blurred = noise::perturb(&blurred, params, &mut rng)?;
        info!(
            "added Gaussian noise (mean: {}, variance: {})",
            config.mean, config.var
        );
    }

    let deblurred = engine::deblur(&blurred, &row_op, &col_op)?;
    match image.mse(&deblurred) {
        Some(mse) => info!("reconstruction MSE: {:.6e}", mse),
        None => warn!("reconstruction MSE unavailable, image shapes diverged"),
    }

    blurred.save(&config.blurred_image)?;
    deblurred.save(&config.deblurred_image)?;

    if config.show_images {
        let path = config.deblurred_image.with_extension("montage.png");
        display::montage(&image, &blurred, &deblurred, &path)?;
    }

    Ok(())
}
