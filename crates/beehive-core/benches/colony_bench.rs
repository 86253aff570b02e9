use beehive_core::{Colony, ColonyConfig, ColonyLayout, ObstacleKind};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::time::Duration;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn bench_colony_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("colony_step");
    group.sample_size(env_or("BEEHIVE_BENCH_SAMPLES", 30_usize).max(10));
    group.warm_up_time(Duration::from_secs(env_or("BEEHIVE_BENCH_WARMUP_SECS", 2)));
    group.measurement_time(Duration::from_secs(env_or("BEEHIVE_BENCH_MEASURE_SECS", 5)));
    let flower_counts: Vec<usize> = std::env::var("BEEHIVE_BENCH_FLOWERS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|t| t.trim().parse::<usize>().ok())
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![6_usize, 200, 1000]);

    for &flowers in &flower_counts {
        group.bench_function(format!("run100_flowers{flowers}"), |b| {
            b.iter_batched(
                || {
                    let config = ColonyConfig {
                        world_width: 200,
                        world_height: 200,
                        simulation_length: 100,
                        history_capacity: 1,
                        ..ColonyConfig::default()
                    };
                    let mut layout = ColonyLayout::standard(6);
                    for seed in 0..flowers as i32 {
                        // Odd rows hold flowers, even rows hold the odd obstacle.
                        let x = (seed * 37) % 200;
                        let y = ((seed * 17) % 100) * 2 + 1;
                        layout = layout.with_flower(x, y, (seed % 5 + 1) as u32);
                        if seed % 7 == 0 {
                            layout = layout.with_obstacle(ObstacleKind::Tree, x, y - 1);
                        }
                    }
                    Colony::new(config, layout).expect("colony")
                },
                |mut colony| {
                    colony.run();
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_colony_steps);
criterion_main!(benches);
