use std::{io::Cursor, path::{Path, PathBuf}};

use image::{ImageFormat, RgbImage};
use tokio::{fs, io::AsyncWriteExt};

use crate::{error::GenError, fingerprint::Fingerprint};

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, GenError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
    Ok(png_bytes)
}

/// Writes `img` to `<out_dir>/<fingerprint>.png` and returns the final path.
pub async fn save_png(
    out_dir: &Path,
    fp: &Fingerprint,
    img: &RgbImage,
) -> Result<PathBuf, GenError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| GenError::Io { path, source }
    };

    fs::create_dir_all(out_dir).await.map_err(io_err(out_dir))?;

    let bytes = encode_png(img)?;
    let png = out_dir.join(fp.file_name());
    let png_tmp = out_dir.join(format!("{}.tmp", fp.file_name()));

    // Write PNG atomically
    {
        let mut f = fs::File::create(&png_tmp).await.map_err(io_err(&png_tmp))?;
        f.write_all(&bytes).await.map_err(io_err(&png_tmp))?;
        if let Err(e) = f.sync_all().await {
            tracing::debug!(path = %png_tmp.display(), "sync failed: {e}");
        }
    }
    fs::rename(&png_tmp, &png).await.map_err(io_err(&png))?;
    Ok(png)
}
