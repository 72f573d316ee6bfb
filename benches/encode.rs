use animgif::{AnimationWriter, Frame, QuantMethod};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;

/// Make a moving color gradient
fn gradient(phase: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity((WIDTH * HEIGHT * 4) as usize);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            buf.push((x + phase) as u8);
            buf.push((y * 2) as u8);
            buf.push((x + y + phase * 3) as u8);
            buf.push(0xFF);
        }
    }
    buf
}

fn encode(bufs: &[Vec<u8>], method: QuantMethod) -> Vec<u8> {
    let mut writer = AnimationWriter::new(WIDTH as u16, HEIGHT as u16)
        .with_loop_count(0)
        .with_quant_method(method);
    writer.start().unwrap();
    for buf in bufs {
        let frame = Frame::with_rgba(WIDTH, HEIGHT, buf).unwrap();
        writer.add_frame(&frame).unwrap();
    }
    writer.finish().unwrap()
}

fn encode_frames(crit: &mut Criterion) {
    let bufs: Vec<Vec<u8>> = (0..8).map(|i| gradient(i * 16)).collect();
    crit.bench_function("encode_median_cut", |b| {
        b.iter(|| encode(black_box(&bufs), QuantMethod::MedianCut))
    });
    crit.bench_function("encode_neuquant", |b| {
        b.iter(|| encode(black_box(&bufs), QuantMethod::NeuQuant))
    });
}

fn encode_batch(crit: &mut Criterion) {
    let bufs: Vec<Vec<u8>> = (0..8).map(|i| gradient(i * 16)).collect();
    crit.bench_function("encode_batch", |b| {
        b.iter(|| {
            let frames: Vec<Frame> = bufs
                .iter()
                .map(|buf| Frame::with_rgba(WIDTH, HEIGHT, buf).unwrap())
                .collect();
            let mut writer = AnimationWriter::new(WIDTH as u16, HEIGHT as u16);
            writer.start().unwrap();
            writer.add_frames(black_box(&frames)).unwrap();
            writer.finish().unwrap()
        })
    });
}

criterion_group!(benches, encode_frames, encode_batch);
criterion_main!(benches);
