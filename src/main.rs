use std::io::Read;
use std::path::PathBuf;

use eyre::WrapErr;
use mimalloc::MiMalloc;
use structopt::StructOpt;
use strum::IntoEnumIterator;

use mindcraft::render::render_frame;
use mindcraft::session::{parse_script, Session};
use mindcraft::world::block::BlockKind;
use mindcraft::world::generator::{GeneratorConfig, WorldGenerator};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, StructOpt)]
#[structopt(name = "mindcraft", about = "Voxel sandbox world core")]
struct Opt {
    /// Log every store mutation
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    command: Cmd,
}

#[derive(Debug, StructOpt)]
struct WorldOpt {
    /// JSON generator config, flags below override it
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(long)]
    seed: Option<u64>,

    #[structopt(long)]
    radius: Option<i32>,

    /// Flat plane without water or trees
    #[structopt(long)]
    flat: bool,
}

impl WorldOpt {
    fn generator_config(&self) -> eyre::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };

        if self.flat {
            config = GeneratorConfig {
                seed: config.seed,
                ..GeneratorConfig::flat(config.radius)
            };
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(radius) = self.radius {
            config.radius = radius;
        }

        Ok(config)
    }
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Generate a world and print its height view
    Generate {
        #[structopt(flatten)]
        world: WorldOpt,

        /// Also dump every layer
        #[structopt(long)]
        layers: bool,
    },
    /// Print the draw list of a generated world as JSON
    Render {
        #[structopt(flatten)]
        world: WorldOpt,

        #[structopt(long)]
        pretty: bool,
    },
    /// Replay a command script (stdin when no file is given)
    Play {
        #[structopt(flatten)]
        world: WorldOpt,

        #[structopt(parse(from_os_str))]
        script: Option<PathBuf>,
    },
}

fn main() -> eyre::Result<()> {
    let opt = Opt::from_args();

    tracing_subscriber::fmt()
        .with_max_level(if opt.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match opt.command {
        Cmd::Generate { world, layers } => {
            let world = WorldGenerator::new(world.generator_config()?)?.generate();

            println!("blocks: {}", world.len());
            println!("columns: {}", world.heights().len());
            for kind in BlockKind::iter() {
                println!("  {kind}: {}", world.count_kind(kind));
            }
            println!("{}", world.height_view());

            if layers {
                println!("{world:?}");
            }
        }
        Cmd::Render { world, pretty } => {
            let world = WorldGenerator::new(world.generator_config()?)?.generate();
            let frame = render_frame(&world);

            let json = if pretty {
                serde_json::to_string_pretty(&frame)?
            } else {
                serde_json::to_string(&frame)?
            };
            println!("{json}");
        }
        Cmd::Play { world, script } => {
            let text = match &script {
                Some(path) => std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("cannot read script {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .wrap_err("cannot read script from stdin")?;
                    text
                }
            };

            let commands = parse_script(&text)?;
            let mut session = Session::new(WorldGenerator::new(world.generator_config()?)?);
            let rejected = session.run(&commands);

            tracing::info!("replayed {} commands, {rejected} rejected", commands.len());
            println!("{}", session.summary());
        }
    }

    Ok(())
}
