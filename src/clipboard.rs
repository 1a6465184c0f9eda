use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;
use image::{DynamicImage, RgbaImage};

pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("cannot open clipboard")?;
    clipboard
        .set_text(text.to_owned())
        .context("cannot write clipboard text")?;
    Ok(())
}

/// Reads an image off the system clipboard, if one is there.
pub fn read_image() -> Result<Option<DynamicImage>> {
    let mut clipboard = Clipboard::new().context("cannot open clipboard")?;
    let data = match clipboard.get_image() {
        Ok(data) => data,
        Err(arboard::Error::ContentNotAvailable) => return Ok(None),
        Err(err) => return Err(err).context("cannot read clipboard image"),
    };

    let width = data.width as u32;
    let height = data.height as u32;
    let image = RgbaImage::from_raw(width, height, data.bytes.into_owned())
        .ok_or_else(|| anyhow!("clipboard image has inconsistent dimensions"))?;
    Ok(Some(DynamicImage::ImageRgba8(image)))
}
