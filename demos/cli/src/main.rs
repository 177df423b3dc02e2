use std::num::NonZeroUsize;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::info;
use nalgebra::{Vector2, Vector3};

use isosurfaces::{Settings, ThreadPool, Tree};

/// Isoline and isosurface extraction demo
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a 2D curve, printing each polyline
    Isoline {
        /// Curve to extract
        #[clap(short, long, value_enum, default_value_t = Curve::Circle)]
        shape: Curve,

        /// Also print the bounds of every leaf cell
        #[clap(long)]
        cells: bool,

        #[clap(flatten)]
        settings: TreeSettings,
    },
    /// Extract a 3D surface, reporting the number of triangles
    Isosurface {
        /// Surface to extract
        #[clap(short, long, value_enum, default_value_t = Surface::Sphere)]
        shape: Surface,

        #[clap(flatten)]
        settings: TreeSettings,
    },
}

#[derive(ValueEnum, Clone, Copy, strum::Display)]
#[strum(serialize_all = "kebab-case")]
enum Curve {
    /// Unit circle
    Circle,
    /// `y^2 - x^3 + x - 0.3`, with an oval and an open branch
    Cubic,
    /// `y (x - y)^2 - 4x - 8`
    DemoCurve,
}

impl Curve {
    fn eval(self, p: &Vector2<f64>) -> f64 {
        let (x, y) = (p.x, p.y);
        match self {
            Curve::Circle => x * x + y * y - 1.0,
            Curve::Cubic => y * y - x * x * x + x - 0.3,
            Curve::DemoCurve => y * (x - y).powi(2) - 4.0 * x - 8.0,
        }
    }

    fn bounds(self) -> (Vector2<f64>, Vector2<f64>) {
        match self {
            Curve::Circle | Curve::Cubic => {
                (Vector2::new(-2.0, -2.0), Vector2::new(2.0, 2.0))
            }
            Curve::DemoCurve => {
                (Vector2::new(-8.0, -6.0), Vector2::new(8.0, 6.0))
            }
        }
    }
}

#[derive(ValueEnum, Clone, Copy, strum::Display)]
#[strum(serialize_all = "kebab-case")]
enum Surface {
    /// Unit sphere
    Sphere,
    /// Double cone, offset from the origin
    Cone,
    /// Two metaballs
    Metaballs,
}

impl Surface {
    fn eval(self, p: &Vector3<f64>) -> f64 {
        match self {
            Surface::Sphere => p.norm_squared() - 1.0,
            Surface::Cone => (p.x - 0.5).powi(2) + p.y * p.y - p.z * p.z,
            Surface::Metaballs => {
                let ball =
                    |y: f64| 1.0 / (p - Vector3::new(0.0, y, 0.0)).norm();
                ball(1.6) + ball(-1.6) - 1.0
            }
        }
    }

    fn bounds(self) -> (Vector3<f64>, Vector3<f64>) {
        let s = match self {
            Surface::Sphere => 2.0,
            Surface::Cone => 4.0,
            Surface::Metaballs => 3.0,
        };
        (Vector3::new(-s, -s, -s), Vector3::new(s, s, s))
    }
}

#[derive(Parser)]
struct TreeSettings {
    /// Minimum subdivision depth
    #[clap(short = 'd', long, default_value_t = 5)]
    min_depth: usize,

    /// Maximum number of leaf cells
    #[clap(short = 'm', long, default_value_t = 10_000)]
    max_cells: usize,

    /// Number of threads to use when building the tree
    ///
    /// If this is 1, the tree is built on the main thread; if it's omitted,
    /// the global Rayon pool is used.
    #[clap(short, long)]
    threads: Option<NonZeroUsize>,

    /// Number of times to extract (for benchmarking)
    #[clap(short = 'N', default_value_t = 1)]
    n: usize,
}

impl TreeSettings {
    /// Builds a thread pool, or `None` for single-threaded operation
    fn pool(&self) -> Result<Option<ThreadPool>> {
        Ok(match self.threads {
            Some(n) if n.get() == 1 => None,
            Some(n) => Some(ThreadPool::Custom(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n.get())
                    .build()?,
            )),
            None => Some(ThreadPool::Global),
        })
    }

    fn settings<'a, const D: usize>(
        &self,
        pool: Option<&'a ThreadPool>,
    ) -> Settings<'a, D> {
        Settings {
            min_depth: self.min_depth,
            max_cells: self.max_cells,
            tol: None,
            threads: pool,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();
    match args.cmd {
        Command::Isoline {
            shape,
            cells,
            settings,
        } => {
            let pool = settings.pool()?;
            let cfg = settings.settings(pool.as_ref());
            let f = |p: &Vector2<f64>| shape.eval(p);
            let (pmin, pmax) = shape.bounds();

            let start = Instant::now();
            let mut lines = vec![];
            for _ in 0..settings.n {
                lines = isosurfaces::extract_isoline(&f, pmin, pmax, &cfg)?;
            }
            info!(
                "Extracted {shape} {}x on {} thread(s) at {:?} ms/iter",
                settings.n,
                cfg.threads.map_or(1, ThreadPool::thread_count),
                start.elapsed().as_micros() as f64
                    / 1000.0
                    / (settings.n as f64)
            );
            info!("Found {} polylines", lines.len());
            for line in &lines {
                let pts: Vec<String> = line
                    .iter()
                    .map(|p| format!("({}, {})", p.x, p.y))
                    .collect();
                println!("[{}]", pts.join(", "));
            }

            if cells {
                let tree = Tree::build(&f, pmin, pmax, &cfg)?;
                for (lo, hi) in isosurfaces::leaf_bounds(&tree) {
                    println!("({}, {}) ({}, {})", lo.x, lo.y, hi.x, hi.y);
                }
            }
        }
        Command::Isosurface { shape, settings } => {
            let pool = settings.pool()?;
            let cfg = settings.settings(pool.as_ref());
            let f = |p: &Vector3<f64>| shape.eval(p);
            let (pmin, pmax) = shape.bounds();

            let start = Instant::now();
            let mut tris = vec![];
            for _ in 0..settings.n {
                tris = isosurfaces::extract_isosurface(&f, pmin, pmax, &cfg)?;
            }
            info!(
                "Extracted {shape} {}x on {} thread(s) at {:?} ms/iter",
                settings.n,
                cfg.threads.map_or(1, ThreadPool::thread_count),
                start.elapsed().as_micros() as f64
                    / 1000.0
                    / (settings.n as f64)
            );
            info!("Found {} triangles", tris.len());
            println!("{}", tris.len());
        }
    }

    Ok(())
}
