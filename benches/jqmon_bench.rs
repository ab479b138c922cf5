use criterion::{Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

use jqmon::models::{EntityKind, Normalizer, Record, Snapshot};
use jqmon::search::{SearchMode, SearchPattern};
use jqmon::tables::{JOB_LIST, list_view};
use jqmon::utils::natural_sort_key;

/// A job snapshot shaped like a busy PBS server
fn job_snapshot(count: usize) -> Snapshot {
    let states = ["R", "Q", "H", "F"];
    let mut raw = BTreeMap::new();
    for i in 0..count {
        let json = format!(
            r#"{{"attributes": {{
                "Job_Name": "run_{i}", "Job_Owner": "user{owner}@login1",
                "job_state": "{state}", "queue": "workq",
                "Resource_List": {{"ncpus": 16, "mem": "32gb", "walltime": "12:00:00"}},
                "resources_used": {{"walltime": "01:{min:02}:00"}},
                "Variable_List": "PBS_O_HOME=/home/user{owner},PBS_O_WORKDIR=/scratch/run_{i}"
            }}}}"#,
            owner = i % 40,
            state = states[i % states.len()],
            min = i % 60,
        );
        let record: Record = serde_json::from_str(&json).expect("valid bench record");
        raw.insert(format!("{}.pbs-head", i), record);
    }
    Snapshot::from_raw(EntityKind::Job, raw, &Normalizer::default())
}

fn benchmark_list_rows(c: &mut Criterion) {
    let snapshot = job_snapshot(5000);
    c.bench_function("job list rows (5000)", |b| {
        b.iter(|| JOB_LIST.list_rows(black_box(&snapshot)))
    });
}

fn benchmark_search(c: &mut Criterion) {
    let snapshot = job_snapshot(5000);
    let pattern = SearchPattern::compile("user1").expect("valid pattern");

    c.bench_function("shallow search (5000)", |b| {
        b.iter(|| list_view(black_box(&snapshot), Some(&pattern), SearchMode::Shallow))
    });
    c.bench_function("deep search (5000)", |b| {
        b.iter(|| list_view(black_box(&snapshot), Some(&pattern), SearchMode::Deep))
    });
}

fn benchmark_natural_sort_key(c: &mut Criterion) {
    c.bench_function("natural sort key", |b| {
        b.iter(|| natural_sort_key(black_box("123456[7].pbs-head01")))
    });
}

criterion_group!(
    benches,
    benchmark_list_rows,
    benchmark_search,
    benchmark_natural_sort_key
);
criterion_main!(benches);
