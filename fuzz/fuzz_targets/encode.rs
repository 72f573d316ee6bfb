// cargo fuzz run encode corpus/encode -- -timeout=30

#![no_main]

use libfuzzer_sys::fuzz_target;

use animgif::{AnimationWriter, Frame, PixelFormat};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let width = u32::from(data[0] % 32) + 1;
    let format = match data[1] & 1 {
        0 => PixelFormat::Rgb,
        _ => PixelFormat::Rgba,
    };
    let quality = data[2];
    let max_colors = u16::from(data[3]) + 1;
    let pixels = &data[4..];
    let row = width as usize * format.channels();
    let height = (pixels.len() / row) as u32;
    if height == 0 {
        return;
    }
    let pixels = &pixels[..row * height as usize];
    let mut writer = AnimationWriter::new(32, 255)
        .with_quality(quality)
        .with_max_colors(max_colors);
    if writer.start().is_err() {
        return;
    }
    if let Ok(frame) = Frame::new(width, height, format, pixels) {
        let frame = frame.with_transparent(quality & 1 == 1);
        let _ = writer.add_frame(&frame);
    }
    let gif = writer.finish().expect("finish after start");
    assert_eq!(gif.last(), Some(&0x3B));
});
