use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use crash_sim::clock::MultiplierClock;
use crash_sim::draw::{RandomDraw, ScriptedDraw};
use crash_sim::sim::{AutoCashOut, simulate};
use crash_sim::store::MemoryStore;
use crash_sim::{Amount, GameConfig, GameSession};

/// Crash points cycling through instant, short and long rounds.
///
/// Pattern (repeating):
/// 1. Instant crash at 1.00
/// 2. Short round crashing at 1.50
/// 3. Long round crashing at 8.00
fn crash_pattern(rounds: usize) -> ScriptedDraw {
    ScriptedDraw::new((0..rounds).map(|i| match i % 3 {
        0 => 1.0,
        1 => 1.5,
        _ => 8.0,
    }))
}

fn strategy() -> AutoCashOut {
    AutoCashOut {
        bet: Amount::from_whole(1),
        target: 2.0,
    }
}

fn bench_clock(c: &mut Criterion) {
    c.bench_function("clock_to_9x", |b| {
        b.iter(|| {
            let mut clock = MultiplierClock::new(0.15);
            while clock.advance() < 9.0 {}
            black_box(clock.raw())
        });
    });
}

fn bench_scripted_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("scripted_rounds");

    for rounds in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &rounds, |b, &rounds| {
            b.iter(|| {
                let mut session = GameSession::new(
                    GameConfig::default(),
                    MemoryStore::new(),
                    crash_pattern(rounds),
                );
                black_box(simulate(&mut session, strategy(), rounds))
            });
        });
    }

    group.finish();
}

fn bench_random_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_rounds");
    group.sample_size(10);

    group.bench_function("1k_seeded", |b| {
        b.iter(|| {
            let config = GameConfig {
                starting_balance: Amount::from_whole(1_000_000),
                ..GameConfig::default()
            };
            let draw = RandomDraw::seeded(7, &config);
            let mut session = GameSession::new(config, MemoryStore::new(), draw);
            black_box(simulate(&mut session, strategy(), 1_000))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_clock,
    bench_scripted_rounds,
    bench_random_rounds,
);

criterion_main!(benches);
