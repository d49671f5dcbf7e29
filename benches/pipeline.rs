use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use retro_camcorder::{
    config::Config,
    grade::FilmSimulation,
    pipeline::FramePipeline,
    video::types::Frame,
};

fn gradient(width: u32, height: u32) -> Frame {
    let mut frame = Frame::new_black(width, height);
    for y in 0..height {
        for x in 0..width {
            frame.set_pixel(
                x,
                y,
                [(x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) % 256) as u8],
            );
        }
    }
    frame
}

fn bench_profiles(c: &mut Criterion) {
    let (width, height) = (640, 360);
    let input = gradient(width, height);

    let mut group = c.benchmark_group("grade_640x360");
    group.throughput(Throughput::Elements(1));
    for simulation in FilmSimulation::ALL {
        let mut config = Config::default();
        config.seed = Some(7);
        config.video.width = width;
        config.video.height = height;
        config.grade.profile = simulation.name().to_string();
        config.timestamp.enabled = false;

        let Ok(pipeline) = FramePipeline::from_config(&config, None) else {
            continue;
        };
        group.bench_function(simulation.name(), |b| {
            b.iter(|| pipeline.process_indexed(black_box(3), input.clone()))
        });
    }
    group.finish();
}

fn bench_full_chain(c: &mut Criterion) {
    let (width, height) = (1280, 720);
    let input = gradient(width, height);

    let mut config = Config::default();
    config.seed = Some(7);
    config.video.width = width;
    config.video.height = height;
    config.aberration.enabled = true;
    config.jitter.enabled = true;
    config.jitter.max_shift_px = 2;
    config.timestamp.date = Some("07-04-'98".to_string());

    let Ok(pipeline) = FramePipeline::from_config(&config, None) else {
        return;
    };
    c.bench_function("full_chain_1280x720", |b| {
        b.iter(|| pipeline.process_indexed(black_box(11), input.clone()))
    });
}

criterion_group!(benches, bench_profiles, bench_full_chain);
criterion_main!(benches);
