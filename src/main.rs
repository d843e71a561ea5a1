#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use anyhow::{anyhow, bail, Context, Result};
    use clap::Parser;
    use pfe::{FieldConfig, ManualScheduler, ParticleField, PixelCanvas, StaticContainer, Time, Vec2};

    #[derive(Parser)]
    #[command(name = "pfe")]
    #[command(about = "Particle Field Engine - interactive linked-particle backgrounds", long_about = None)]
    struct Cli {
        /// JSON configuration file (overrides the profile)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in profile: fluid or simple
        #[arg(short, long, default_value = "fluid")]
        profile: String,

        /// Seed for reproducible particle layouts
        #[arg(long)]
        seed: Option<u64>,

        /// Render without a window and write a snapshot
        #[arg(long)]
        headless: bool,

        /// Headless container size, WIDTHxHEIGHT in logical pixels
        #[arg(long, default_value = "1280x720", value_parser = parse_size)]
        size: Vec2,

        /// Headless device pixel ratio
        #[arg(long, default_value_t = 1.0)]
        pixel_ratio: f32,

        /// Headless frames to simulate
        #[arg(long, default_value_t = 120)]
        frames: u32,

        /// Headless pointer position, X,Y in logical pixels
        #[arg(long, value_parser = parse_point)]
        pointer: Option<Vec2>,

        /// Headless snapshot path
        #[arg(long, default_value = "field.png")]
        snapshot: PathBuf,
    }

    fn parse_pair(s: &str, sep: char) -> Result<Vec2> {
        let (a, b) = s
            .split_once(sep)
            .ok_or_else(|| anyhow!("expected two numbers separated by '{sep}'"))?;
        Ok(Vec2::new(a.trim().parse()?, b.trim().parse()?))
    }

    fn parse_size(s: &str) -> Result<Vec2> {
        let size = parse_pair(s, 'x')?;
        if size.x <= 0.0 || size.y <= 0.0 {
            bail!("size must be positive");
        }
        Ok(size)
    }

    fn parse_point(s: &str) -> Result<Vec2> {
        parse_pair(s, ',')
    }

    fn load_config(cli: &Cli) -> Result<FieldConfig> {
        let mut config = match &cli.config {
            Some(path) => FieldConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => FieldConfig::profile(&cli.profile)
                .ok_or_else(|| anyhow!("unknown profile '{}' (expected fluid or simple)", cli.profile))?,
        };
        if let Some(seed) = cli.seed {
            config.seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }

    fn run_headless(cli: &Cli, config: FieldConfig) -> Result<()> {
        let container = StaticContainer::new(cli.size).with_pixel_ratio(cli.pixel_ratio);
        let mut field = ParticleField::new(config, Some(PixelCanvas::new()), ManualScheduler::new())
            .with_time(Time::fixed(1.0 / 60.0));
        field.start(Some(&container));

        if let Some(pointer) = cli.pointer {
            field.pointer_move(pointer);
        }
        for _ in 0..cli.frames {
            field.advance_frame();
        }

        let stats = field.last_stats();
        log::info!(
            "{} frames: {} particles, {} links ({} broken)",
            field.time().frame(),
            stats.particles,
            stats.links,
            stats.broken_links
        );

        let canvas = field
            .surface()
            .ok_or_else(|| anyhow!("headless canvas missing"))?;
        canvas
            .save_png(&cli.snapshot)
            .with_context(|| format!("writing {}", cli.snapshot.display()))?;
        println!("{}", cli.snapshot.display());
        Ok(())
    }

    pub fn main() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let cli = Cli::parse();
        let config = load_config(&cli)?;

        if cli.headless {
            run_headless(&cli, config)
        } else {
            pfe::run(config).context("running particle field window")
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
