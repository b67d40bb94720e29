use criterion::{Criterion, black_box, criterion_group, criterion_main};

use spektra_core::{AudioSignal, WatermarkConfig};

fn make_test_audio(num_samples: usize, sample_rate: u32) -> Vec<f32> {
    let mut samples = vec![0.0f32; num_samples];
    for (i, sample) in samples.iter_mut().enumerate() {
        let t = i as f32 / sample_rate as f32;
        for k in 1u32..80 {
            let freq = k as f32 * 60.0;
            let amp = 1.0 / (k as f32).sqrt();
            *sample += amp * (2.0 * std::f32::consts::PI * freq * t + k as f32).sin();
        }
    }
    spektra_core::signal::normalize_peak(&mut samples);
    samples
}

fn bench_encode(c: &mut Criterion) {
    let config = WatermarkConfig::default();
    let host = AudioSignal::new(make_test_audio(44100, 44100), 44100);
    let watermark = AudioSignal::new(make_test_audio(22050, 44100), 44100);

    c.bench_function("encode_1s_44khz", |b| {
        b.iter(|| {
            spektra_core::encode(black_box(&host), black_box(&watermark), &config).unwrap();
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let config = WatermarkConfig::default();
    let host = AudioSignal::new(make_test_audio(44100 * 10, 44100), 44100);
    let watermark = AudioSignal::new(make_test_audio(44100 * 5, 44100), 44100);
    let encoded = spektra_core::encode(&host, &watermark, &config).unwrap();

    c.bench_function("decode_10s_44khz", |b| {
        b.iter(|| {
            spektra_core::decode(
                black_box(&host),
                black_box(&encoded.signal),
                &encoded.metadata,
                &config,
            )
            .unwrap();
        });
    });
}

fn bench_encode_resampled(c: &mut Criterion) {
    let config = WatermarkConfig::default();
    let host = AudioSignal::new(make_test_audio(48000, 48000), 48000);
    let watermark = AudioSignal::new(make_test_audio(44100, 44100), 44100);

    c.bench_function("encode_1s_resample_44k_to_48k", |b| {
        b.iter(|| {
            spektra_core::encode(black_box(&host), black_box(&watermark), &config).unwrap();
        });
    });
}

fn bench_spectrum(c: &mut Criterion) {
    let samples = make_test_audio(44100, 44100);
    let fft = spektra_core::spectrum::SpectrumProcessor::new(samples.len()).unwrap();

    c.bench_function("spectrum_round_trip_44100", |b| {
        b.iter(|| {
            let bins = fft.forward(black_box(&samples)).unwrap();
            black_box(fft.inverse_real(bins).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_encode_resampled,
    bench_spectrum,
);

criterion_main!(benches);
