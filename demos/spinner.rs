// spinner.rs      animgif demo
//
// Copyright (c) 2026  Douglas Lau
//
//! Write a spinning dot animation to `spinner.gif`
#![forbid(unsafe_code)]

use animgif::{AnimationWriter, Frame};
use pix::Raster;
use pix::rgb::SRgba8;
use std::error::Error;
use std::f32::consts::PI;
use std::fs::File;
use std::io::Write;

const SIZE: u32 = 48;
const STEPS: u32 = 12;

/// Draw one step of the spinner
fn spinner_raster(step: u32) -> Raster<SRgba8> {
    let mut raster = Raster::with_clear(SIZE, SIZE);
    let angle = 2.0 * PI * step as f32 / STEPS as f32;
    let center = SIZE as f32 / 2.0;
    let cx = center + angle.cos() * center * 0.6;
    let cy = center + angle.sin() * center * 0.6;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if d < 6.0 {
                let shade = (255.0 - d * 30.0) as u8;
                *raster.pixel_mut(x as i32, y as i32) =
                    SRgba8::new(shade, 64, 255 - shade, 255);
            }
        }
    }
    raster
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut writer = AnimationWriter::new(SIZE as u16, SIZE as u16)
        .with_loop_count(0)
        .with_frame_rate(15)
        .with_quality(1);
    writer.start()?;
    for step in 0..STEPS {
        let raster = spinner_raster(step);
        let frame = Frame::with_raster(&raster)?.with_transparent(true);
        writer.add_frame(&frame)?;
    }
    let gif = writer.finish()?;
    let mut file = File::create("spinner.gif")?;
    file.write_all(&gif)?;
    println!("wrote spinner.gif: {} bytes", gif.len());
    Ok(())
}
