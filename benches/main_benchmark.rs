use criterion::{Criterion, criterion_group, criterion_main};
use modtree::oracle::{ModuleEntry, parse_module_stream};
use modtree::test_utils::{FakeOracle, ProjectLayout};
use modtree::tree::{BuildOptions, build_forest};
use std::fmt::Write;
use std::hint::black_box;
use std::path::Path;

fn mock_listing(count: usize) -> String {
    let mut out = String::from(
        "{\n\t\"Path\": \"example.com/app\",\n\t\"Main\": true,\n\t\"Dir\": \"/src/app\"\n}\n",
    );
    for i in 0..count {
        let _ = write!(
            out,
            "{{\n\t\"Path\": \"github.com/org/mod{i}\",\n\t\"Version\": \"v1.{i}.0\",\n\t\"Indirect\": {},\n\t\"Dir\": \"/go/pkg/mod/github.com/org/mod{i}@v1.{i}.0\"\n}}\n",
            i % 3 == 0
        );
    }
    out
}

fn bench_parse_listing(c: &mut Criterion) {
    let listing = mock_listing(500);
    c.bench_function("parse_go_list_500", |b| {
        b.iter(|| {
            parse_module_stream(Path::new("/src/app"), "go list", black_box(listing.as_bytes()))
                .unwrap()
        })
    });
}

/// Three levels, eight modules wide, every module backed by a go.mod.
fn wide_graph(layout: &ProjectLayout, oracle: &FakeOracle) -> std::path::PathBuf {
    let root = layout.module_dir("app", true);
    let mut level = vec![root.clone()];
    for depth in 0..3 {
        let mut next = Vec::new();
        for (p, parent) in level.iter().enumerate() {
            let mut entries = Vec::new();
            for i in 0..8 {
                let name = format!("m{depth}_{p}_{i}");
                let dir = layout.module_dir(&name, depth < 2);
                entries.push(ModuleEntry::dependency(&name, "v1.0.0", &dir));
                next.push(dir);
            }
            oracle.set_listing(parent, entries);
        }
        level = next;
    }
    root
}

fn bench_build_forest(c: &mut Criterion) {
    let layout = ProjectLayout::new();
    let oracle = FakeOracle::new();
    let root = wide_graph(&layout, &oracle);

    for jobs in [1, 4] {
        let options = BuildOptions {
            jobs,
            ..Default::default()
        };
        c.bench_function(&format!("build_forest_jobs_{jobs}"), |b| {
            b.iter(|| build_forest(&oracle, black_box(&root), options).unwrap())
        });
    }
}

criterion_group!(benches, bench_parse_listing, bench_build_forest);
criterion_main!(benches);
