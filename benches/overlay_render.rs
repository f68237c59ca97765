use criterion::{criterion_group, criterion_main, Criterion};
use scan_annotator::viewer::model::{Annotation, AnnotationId, ShapeKind, ACCENT};
use scan_annotator::viewer::overlay::AnnotationFrameBuffer;

fn bench_overlay_full_repaint(c: &mut Criterion) {
    let annotations: Vec<Annotation> = (0..50)
        .map(|i| Annotation {
            id: AnnotationId(i),
            shape: if i % 2 == 0 {
                ShapeKind::Rectangle
            } else {
                ShapeKind::Ellipse
            },
            origin: (0.01 * i as f32, 0.015 * i as f32),
            extent: (0.2, 0.15),
            comment: if i % 3 == 0 {
                format!("finding {i}")
            } else {
                String::new()
            },
            stroke_color: ACCENT,
        })
        .collect();

    let mut buffer = AnnotationFrameBuffer::default();
    c.bench_function("overlay_repaint_50_annotations_1024", |b| {
        b.iter(|| buffer.render(&annotations, None, (1024, 768)))
    });
}

criterion_group!(benches, bench_overlay_full_repaint);
criterion_main!(benches);
