//! Criterion benchmarks for statcard critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Color: theme colour parsing
//! - Chip: styling one entity
//! - Roster: laying out 0-4 chips
//! - Render: a full card, resolution through encoding

use async_trait::async_trait;
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;

use statcard::assets::{AssetStore, ImageRepository, RepositoryError};
use statcard::chip::StyledEntityRenderer;
use statcard::color::parse_color;
use statcard::config::{CardConfig, Theme};
use statcard::ledger::{ResourceKind, ResourceLedger};
use statcard::mode::GameMode;
use statcard::models::{CycleWindow, EntityRef, NodeRecord, ProfileHeader, SectionRecord, Snapshot};
use statcard::resolve::ResolvedEntity;
use statcard::roster::RosterLayoutEngine;
use statcard::{CardEngine, RenderOptions};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Serves a generated PNG for every key
struct MemoryRepository;

#[async_trait]
impl ImageRepository for MemoryRepository {
    async fn open_stream(&self, key: &str) -> Result<Vec<u8>, RepositoryError> {
        let (w, h) = if key.ends_with("_bg") { (640, 480) } else { (128, 128) };
        let shade = key.len() as u8;
        let img = RgbaImage::from_fn(w, h, |x, y| Rgba([shade, x as u8, y as u8, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png)
            .map_err(|e| RepositoryError::Other(e.to_string()))?;
        Ok(out.into_inner())
    }
}

fn make_snapshot(mode: GameMode, sections: u32) -> Snapshot {
    let node = NodeRecord {
        roster: (0..4).map(|i| EntityRef::new(1000 + i, 80, 4 + (i % 2) as u8, i as u8)).collect(),
        score: Some(35000),
        buff: Some(2),
        boss_defeated: true,
        battle_secs: Some(140),
    };
    Snapshot {
        mode,
        group_name: "Bench".to_string(),
        window: CycleWindow {
            start: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 2, 17).unwrap(),
        },
        total_stars: sections * 3,
        ratings: vec![],
        most_used: vec![],
        sections: (1..=sections)
            .map(|index| SectionRecord {
                index,
                stars: 3,
                cycles: Some(5),
                nodes: vec![node.clone(), node.clone()],
                ..Default::default()
            })
            .collect(),
    }
}

fn profile() -> ProfileHeader {
    ProfileHeader {
        display_name: "Bench".to_string(),
        numeric_id: 100000001,
        level: 70,
    }
}

// =============================================================================
// Color Parsing Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#FFDAB9"))));

    group.bench_function("parse_hex_8", |b| b.iter(|| parse_color(black_box("#00000080"))));

    group.bench_function("parse_named", |b| b.iter(|| parse_color(black_box("peachpuff"))));

    group.finish();
}

// =============================================================================
// Chip and Roster Benchmarks
// =============================================================================

fn bench_chip(c: &mut Criterion) {
    let assets = AssetStore::empty();
    let portrait = RgbaImage::from_pixel(256, 256, Rgba([40, 120, 200, 255]));

    c.bench_function("chip/style", |b| {
        b.iter(|| {
            let mut ledger = ResourceLedger::new();
            let handle = ledger.track(ResourceKind::Portrait, portrait.clone());
            let mut renderer = StyledEntityRenderer::new(Theme::default());
            let resolved = ResolvedEntity {
                entity: EntityRef::new(1205, 80, 5, 6),
                portrait: handle,
            };
            renderer.style(black_box(resolved), &mut ledger, &assets)
        })
    });
}

fn bench_roster(c: &mut Criterion) {
    let mut group = c.benchmark_group("roster");
    let assets = AssetStore::empty();
    let engine = RosterLayoutEngine::new();

    let chip = RgbaImage::from_pixel(150, 180, Rgba([9, 9, 9, 255]));

    for count in 0..=4usize {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("layout", count), &count, |b, &count| {
            b.iter(|| {
                let mut ledger = ResourceLedger::new();
                let chips: Vec<_> = (0..count)
                    .map(|_| ledger.track(ResourceKind::Chip, chip.clone()))
                    .collect();
                engine.layout(black_box(&chips), &mut ledger, &assets)
            })
        });
    }

    group.finish();
}

// =============================================================================
// Full Render Benchmarks
// =============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(10);

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
    let repo = MemoryRepository;
    let engine = CardEngine::new(CardConfig::default()).unwrap();
    runtime.block_on(engine.load(&repo)).unwrap();
    let options = RenderOptions::new("bench");

    for (mode, sections) in [(GameMode::PureFiction, 4), (GameMode::MemoryOfChaos, 12)] {
        let snapshot = make_snapshot(mode, sections);
        group.bench_with_input(BenchmarkId::new("card", mode), &snapshot, |b, snapshot| {
            b.iter(|| {
                runtime.block_on(engine.render(black_box(snapshot), &profile(), &repo, &options))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_color, bench_chip, bench_roster, bench_render);
criterion_main!(benches);
