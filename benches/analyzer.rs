use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use atmolight_rs::ambient_pipeline::{
    AnalyzeSettings, ChannelLayout, Frame, FrameAnalyzer, Rgb, TemporalFilter, FilterSettings,
};

fn generate_gradient_frame(width: usize, height: usize) -> Frame {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Frame::new(width, height, data)
}

fn full_layout() -> ChannelLayout {
    ChannelLayout {
        top: 8,
        bottom: 8,
        left: 5,
        right: 5,
        center: 1,
        top_left: 1,
        top_right: 1,
        bottom_left: 1,
        bottom_right: 1,
    }
}

fn benchmark_analyze_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_by_size");

    for analyze_size in 0..=3u32 {
        let settings = AnalyzeSettings {
            analyze_size,
            ..Default::default()
        };
        let width = settings.analyze_width() as usize;
        let frame = generate_gradient_frame(width, width * 9 / 16);

        group.bench_with_input(BenchmarkId::from_parameter(width), &frame, |b, frame| {
            let mut analyzer = FrameAnalyzer::new(full_layout());
            let mut out = vec![Rgb::BLACK; full_layout().total()];

            b.iter(|| analyzer.analyze_frame(black_box(frame), &settings, &mut out));
        });
    }

    group.finish();
}

fn benchmark_channel_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_by_channels");
    let frame = generate_gradient_frame(128, 72);
    let settings = AnalyzeSettings::default();

    for edge in [1usize, 5, 15, 25] {
        let layout = ChannelLayout {
            top: edge,
            bottom: edge,
            left: edge,
            right: edge,
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(layout.total()), &layout, |b, layout| {
            let mut analyzer = FrameAnalyzer::new(*layout);
            let mut out = vec![Rgb::BLACK; layout.total()];

            b.iter(|| analyzer.analyze_frame(black_box(&frame), &settings, &mut out));
        });
    }

    group.finish();
}

fn benchmark_mean_filter(c: &mut Criterion) {
    let channels = full_layout().total();
    let analyzed: Vec<Rgb> = (0..channels).map(|i| Rgb::new(i as u8 * 7, 128, 255 - i as u8)).collect();
    let settings = FilterSettings::default();
    let mut filter = TemporalFilter::new(channels);

    c.bench_function("mean_filter", |b| {
        b.iter(|| {
            filter.apply(black_box(&analyzed), &settings);
        })
    });
}

criterion_group!(benches, benchmark_analyze_sizes, benchmark_channel_counts, benchmark_mean_filter);
criterion_main!(benches);
