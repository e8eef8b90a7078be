use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use codenav::{load_image, NavigatorConfig};

#[path = "../tests/common/mod.rs"]
mod common;

fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation");
    let image = load_image(common::pe32_image(), &NavigatorConfig::default()).unwrap();

    group.bench_function("step_down_page", |b| {
        let mut nav = image.navigator().unwrap();
        b.iter(|| {
            nav.seek_vertical(0x1000);
            nav.step_down(40)
        })
    });

    group.bench_function("step_up_page", |b| {
        let mut nav = image.navigator().unwrap();
        b.iter(|| {
            nav.seek_vertical(0x1180);
            nav.step_up(40).unwrap()
        })
    });

    for offset in [0x1100i64, 0x1800, 0x2400] {
        group.bench_with_input(BenchmarkId::new("seek", offset), &offset, |b, &offset| {
            let mut nav = image.navigator().unwrap();
            b.iter(|| nav.seek_vertical(offset))
        });
    }

    group.bench_function("get_lines_screen", |b| {
        let mut nav = image.navigator().unwrap();
        let top = nav.seek_vertical(0x1100);
        b.iter(|| nav.get_lines(top, top + 60))
    });
    group.finish();
}

criterion_group!(benches, bench_navigation);
criterion_main!(benches);
