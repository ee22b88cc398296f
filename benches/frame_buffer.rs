//! Benchmarks for the consumer-side frame path
//!
//! Measures what a tracker pays per cycle:
//! - storing a decoded frame as latest (network side)
//! - capture + copy of the current frame at VGA resolution
//!
//! Platform: Cross-platform, no network involved

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use image::ImageFormat;
use pose_relay::RelayHandle;
use pose_relay::buffer::FrameBuffer;
use pose_relay::codec::{decode_frame, encode_frame};
use pose_relay::types::DecodedImage;
use std::hint::black_box;

fn vga_frame() -> DecodedImage {
    DecodedImage::filled(640, 480, [200, 40, 40]).expect("valid frame")
}

fn bench_buffer_swap(c: &mut Criterion) {
    let frame = vga_frame();
    let mut buffer = FrameBuffer::new();

    c.bench_function("store_and_capture", |b| {
        b.iter(|| {
            let evicted = buffer.store_latest(black_box(frame.clone()));
            black_box(buffer.capture());
            black_box(evicted)
        })
    });
}

fn bench_current_copy(c: &mut Criterion) {
    let relay = RelayHandle::new();
    let payload = encode_frame(&vga_frame(), ImageFormat::Png).expect("encode");
    relay.on_binary_message(&payload);
    relay.capture_latest();

    let mut group = c.benchmark_group("consumer_cycle");
    group.throughput(Throughput::Bytes(640 * 480 * 3));

    group.bench_function("capture_and_copy_vga", |b| {
        b.iter(|| {
            black_box(relay.capture_latest());
            black_box(relay.current_image())
        })
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let payload = encode_frame(&vga_frame(), ImageFormat::Jpeg).expect("encode");

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("jpeg_vga", |b| b.iter(|| black_box(decode_frame(black_box(&payload)))));
    group.finish();
}

criterion_group!(benches, bench_buffer_swap, bench_current_copy, bench_decode);
criterion_main!(benches);
