use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hltrate::menu::{Diagnostics, RateCalculator};
use hltrate::menu_cfg::{build_menu, MenuCfg, PathCfg};
use hltrate::pass_counts::PassCounts;
use trig_event_reader::{TrigBits, TrigEvent};

const NR_L1_SEEDS: usize = 64;
const NR_EVENTS: usize = 1000;

/// A menu with `nr_paths` paths spread over 8 datasets, each seeded by 2 of [NR_L1_SEEDS] L1 seeds.
fn synthetic_menu(nr_paths: usize) -> RateCalculator {
    let hlt_paths = (0..nr_paths).map(|i| format!("HLT_Path{i}_v1")).collect();
    let l1_seeds = (0..NR_L1_SEEDS).map(|i| (format!("L1_Seed{i}"), i)).collect();
    let paths = (0..nr_paths)
        .map(|i| PathCfg {
            name: format!("HLT_Path{i}_v"),
            datasets: vec![format!("Dataset{}", i % 8)],
            l1_seeds: vec![
                format!("L1_Seed{}", i % NR_L1_SEEDS),
                format!("L1_Seed{}", (i * 7 + 3) % NR_L1_SEEDS),
            ],
            prescales: vec![1, (i % 5) as u32 + 1, 0],
            physics: true,
            disable: false,
        })
        .collect();
    let cfg = MenuCfg {
        ps_count_offset: 341,
        hlt_paths,
        l1_seeds,
        paths,
    };
    build_menu(&cfg, None, Diagnostics::muted()).expect("Invalid synthetic menu")
}

/// Deterministic events where roughly a third of the bits are set.
fn synthetic_events(nr_paths: usize) -> Vec<TrigEvent> {
    (0..NR_EVENTS)
        .map(|ev| {
            let l1: Vec<bool> = (0..NR_L1_SEEDS).map(|i| (ev + i) % 3 == 0).collect();
            let hlt: Vec<bool> = (0..nr_paths).map(|i| (ev * 5 + i) % 3 == 0).collect();
            TrigEvent::new(TrigBits::from_bools(&l1), TrigBits::from_bools(&hlt))
        })
        .collect()
}

pub fn bench_process_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_events");

    for nr_paths in [16, 128, 512].iter() {
        let events = synthetic_events(*nr_paths);
        let mut calc = synthetic_menu(*nr_paths);
        group.bench_with_input(
            BenchmarkId::new("RateCalculator", nr_paths),
            &events,
            |b, events| {
                b.iter(|| {
                    for event in events {
                        calc.process_event(black_box(event))
                            .expect("Event too short for menu");
                    }
                });
            },
        );
        let mut pass_counts = PassCounts::new(0, *nr_paths);
        group.bench_with_input(
            BenchmarkId::new("PassCounts", nr_paths),
            &events,
            |b, events| {
                b.iter(|| {
                    for event in events {
                        pass_counts
                            .add(black_box(&event.hlt))
                            .expect("Event too short for pass counts");
                    }
                });
            },
        );
    }
    group.finish();
}

pub fn bench_merge(c: &mut Criterion) {
    let calc = synthetic_menu(512);
    let mut worker = calc.fresh_copy();
    for event in &synthetic_events(512) {
        worker.process_event(event).expect("Event too short for menu");
    }

    c.bench_function("merge_512_paths", |b| {
        b.iter(|| {
            let mut total = calc.fresh_copy();
            total.merge(black_box(&worker)).expect("Menus differ");
            total
        });
    });
}

criterion_group!(benches, bench_process_events, bench_merge);
criterion_main!(benches);
