// tools/gen-golden: ORS maps for every PNG in crates/ors/testdata/images
use anyhow::Context;
use image::ImageReader;
use ors::app::write_map_bin;
use ors::response::{ors_response_u8_with, OrsKernel};
use ors::OrsParams;
use std::path::{Path, PathBuf};
use tracing::info;

const HALF_SIZE: u32 = 5;

fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../crates/ors/testdata")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let root = testdata_dir();
    let images_dir = root.join("images");
    let golden_dir = root.join("golden");
    let imgs = std::fs::read_dir(&images_dir)
        .with_context(|| format!("reading {}", images_dir.display()))?;
    std::fs::create_dir_all(&golden_dir)?;

    let params = OrsParams::default().with_half_size(HALF_SIZE);
    let kernel = OrsKernel::new(&params);

    for e in imgs {
        let p = e?.path();
        if p.extension().and_then(|s| s.to_str()) != Some("png") {
            continue;
        }
        let img = ImageReader::open(&p)?.decode()?.to_luma8();

        let w = img.width() as usize;
        let h = img.height() as usize;
        let map = ors_response_u8_with(img.as_raw(), w, h, &kernel)
            .with_context(|| format!("computing ORS for {}", p.display()))?;

        let name = p
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out = golden_dir.join(format!("{name}.bin"));
        write_map_bin(&out, &map)?;
        info!("golden: {} -> {}", p.display(), out.display());
    }
    Ok(())
}
