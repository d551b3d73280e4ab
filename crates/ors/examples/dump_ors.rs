use anyhow::Context;
use ors::app::{load_config, run_ors, InputScale, Mode, OrsConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: dump_ors <image> [--half-size N] [--mode catalogue|direct] \
                     [--scale unit|levels] [--invert] | dump_ors --config <file.json>";

fn parse_args() -> anyhow::Result<OrsConfig> {
    let mut args = std::env::args().skip(1);
    let first = args.next().context(USAGE)?;

    if first == "--config" {
        let path: PathBuf = args.next().context("expected a path after --config")?.into();
        return load_config(&path);
    }

    let mut cfg = OrsConfig::new(first);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--half-size" => {
                let v = args.next().context("expected an integer after --half-size")?;
                cfg.half_size = Some(
                    v.parse()
                        .context("could not parse half-size (use integer >= 1)")?,
                );
            }
            "--mode" => {
                let v = args.next().context("expected a mode after --mode")?;
                cfg.mode = Some(v.parse::<Mode>().map_err(anyhow::Error::msg)?);
            }
            "--scale" => {
                let v = args.next().context("expected a scale after --scale")?;
                cfg.input_scale = Some(v.parse::<InputScale>().map_err(anyhow::Error::msg)?);
            }
            "--invert" => cfg.invert = Some(true),
            other => anyhow::bail!("unknown argument: {other}\n{USAGE}"),
        }
    }
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    let cfg = parse_args()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(cfg.log_level.clone().unwrap_or_else(|| "info".to_string()))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let dump = run_ors(&cfg)?;
    println!(
        "ors {}x{} -> {}x{} (half_size={}, {:?}, {:?}) in {:.2} ms",
        dump.width,
        dump.height,
        dump.ors_width,
        dump.ors_height,
        dump.half_size,
        dump.mode,
        dump.input_scale,
        dump.elapsed_ms
    );
    println!(
        "min {:.4}  max {:.4}  mean {:.4}",
        dump.stats.min, dump.stats.max, dump.stats.mean
    );
    Ok(())
}
