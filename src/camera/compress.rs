use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};

use crate::camera::error::{CameraError, Result};
use crate::camera::types::{Frame, StillImage};

/// Compress raw RGB pixel data to JPEG at the given quality (1-100).
pub fn compress_jpeg(data: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>> {
    let img: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(width, height, data)
        .ok_or_else(|| CameraError::Encode(format!("invalid buffer for {width}x{height}")))?;

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    img.write_with_encoder(encoder)
        .map_err(|e| CameraError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Downscale raw RGB data so that it is at most `max_width` wide, keeping the
/// aspect ratio. Frames already within bounds are returned unchanged.
///
/// Uses `fast_image_resize` for SIMD-accelerated resizing.
pub fn downscale_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    max_width: u32,
) -> Result<(Vec<u8>, u32, u32)> {
    use fast_image_resize as fr;
    use fr::images::Image;

    if max_width == 0 || width <= max_width {
        return Ok((data.to_vec(), width, height));
    }

    let dst_width = max_width;
    let dst_height = ((u64::from(height) * u64::from(max_width)) / u64::from(width)).max(1) as u32;

    let src_image = Image::from_vec_u8(width, height, data.to_vec(), fr::PixelType::U8x3)
        .map_err(|e| CameraError::Encode(e.to_string()))?;
    let mut dst_image = Image::new(dst_width, dst_height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, None)
        .map_err(|e| CameraError::Encode(e.to_string()))?;

    Ok((dst_image.into_vec(), dst_width, dst_height))
}

/// Turn a captured frame into the still image submitted for recognition.
pub fn encode_still(frame: &Frame, quality: u8, max_width: u32) -> Result<StillImage> {
    let (data, width, height) = downscale_rgb(&frame.data, frame.width, frame.height, max_width)?;
    let jpeg = compress_jpeg(&data, width, height, quality)?;
    Ok(StillImage {
        jpeg,
        width,
        height,
    })
}
