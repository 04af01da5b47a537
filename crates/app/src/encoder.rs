use std::{fs::File, io::BufWriter, path::Path};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, ImageFormat, RgbaImage,
};
use sban_midi_core::{Animation, ImageEncoder, Raster, Result, SbanMidiError};

/// Writes stills as PNG and animations as looping GIF.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileEncoder;

impl ImageEncoder for FileEncoder {
    fn encode_still(&self, path: &Path, raster: &Raster) -> Result<()> {
        to_image(raster)?
            .save_with_format(path, ImageFormat::Png)
            .map_err(image_error)?;
        tracing::debug!(?path, "wrote png");
        Ok(())
    }

    fn encode_animation(&self, path: &Path, animation: &Animation) -> Result<()> {
        let delay_micros = (animation.frame_duration_ms * 1000.0).round() as u32;
        let delay = Delay::from_numer_denom_ms(delay_micros, 1000);
        let frames = animation
            .frames
            .iter()
            .map(|raster| Ok(Frame::from_parts(to_image(raster)?, 0, 0, delay)))
            .collect::<Result<Vec<_>>>()?;

        let mut encoder = GifEncoder::new(BufWriter::new(File::create(path)?));
        encoder.set_repeat(Repeat::Infinite).map_err(image_error)?;
        encoder.encode_frames(frames).map_err(image_error)?;
        tracing::debug!(?path, "wrote gif");
        Ok(())
    }
}

fn to_image(raster: &Raster) -> Result<RgbaImage> {
    RgbaImage::from_raw(raster.width(), raster.height(), raster.as_bytes().to_vec())
        .ok_or_else(|| SbanMidiError::msg("raster size does not match its dimensions"))
}

fn image_error(err: image::ImageError) -> SbanMidiError {
    SbanMidiError::msg(format!("image encoding failed: {err}"))
}
