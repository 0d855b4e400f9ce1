use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use status_core::{
    config::EngineConfig,
    entity::{BaseAttributes, EntitySpec},
    stats::{recalculate, StatBlock, StatInputs},
    status::{ActiveEffect, EffectDatabase, EffectKind, EffectTable, StartRequest},
    StatusEngine,
};

fn bench_recalculate(c: &mut Criterion) {
    let db = EffectDatabase::builtin();
    let config = EngineConfig::default();
    let base = BaseAttributes::default();
    let equipment = StatBlock::new();

    // 스탯 보정이 있는 버프/디버프를 잔뜩 걸어 둔 상태
    let mut effects = EffectTable::new();
    for kind in EffectKind::ALL.iter().copied().filter(|k| {
        db.get(*k)
            .map(|d| !d.modifiers.is_empty() || !d.overrides.is_empty())
            .unwrap_or(false)
    }) {
        let groups = db.get(kind).map(|d| d.groups).unwrap_or_default();
        effects.insert(ActiveEffect::new(kind, [5, 0, 0, 0], groups));
    }

    c.bench_function("recalculate", |b| {
        b.iter(|| {
            black_box(recalculate(&StatInputs {
                base: &base,
                equipment: &equipment,
                effects: &effects,
                db: &db,
                bounds: &config.bounds,
            }));
        })
    });
}

fn bench_poison_lifecycle(c: &mut Criterion) {
    let config = Arc::new(EngineConfig::default());
    let db = Arc::new(EffectDatabase::builtin());

    c.bench_function("poison_lifecycle_100", |b| {
        b.iter(|| {
            let mut engine = StatusEngine::new(config.clone(), db.clone(), 1);
            let ids: Vec<_> = (0..100)
                .map(|_| engine.spawn(EntitySpec::monster(BaseAttributes::default())))
                .collect();
            for id in &ids {
                let _ = engine.start_effect(
                    *id,
                    StartRequest::new(EffectKind::Poison)
                        .duration(9_000)
                        .unconditional(),
                );
            }
            engine.advance(30_000);
            black_box(engine.observer().entries.len());
        })
    });
}

criterion_group!(benches, bench_recalculate, bench_poison_lifecycle);
criterion_main!(benches);
