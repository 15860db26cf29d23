use super::*;

fn viewport() -> BoundingBox {
    BoundingBox::from_size(800.0, 600.0)
}

#[test]
fn missing_rotation_deserializes_to_zero() {
    let b: BoundingBox =
        serde_json::from_str(r#"{"x":10,"y":20,"width":30,"height":40}"#).unwrap();
    assert_eq!(b, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
    assert_eq!(b.rotation, 0.0);

    let b: BoundingBox =
        serde_json::from_str(r#"{"x":10,"y":20,"width":30,"height":40,"rotation":45}"#)
            .unwrap();
    assert_eq!(b.rotation, 45.0);
}

#[test]
fn overlap_inside_and_partial() {
    assert!(BoundingBox::new(100.0, 100.0, 50.0, 50.0).overlaps(&viewport()));
    assert!(BoundingBox::new(-50.0, 100.0, 100.0, 50.0).overlaps(&viewport()));
    assert!(BoundingBox::new(100.0, -50.0, 100.0, 100.0).overlaps(&viewport()));
}

#[test]
fn overlap_rejects_boxes_on_every_side() {
    assert!(!BoundingBox::new(-200.0, 100.0, 50.0, 50.0).overlaps(&viewport()));
    assert!(!BoundingBox::new(900.0, 100.0, 50.0, 50.0).overlaps(&viewport()));
    assert!(!BoundingBox::new(100.0, -200.0, 50.0, 50.0).overlaps(&viewport()));
    assert!(!BoundingBox::new(100.0, 700.0, 50.0, 50.0).overlaps(&viewport()));
}

#[test]
fn overlap_counts_touching_edges() {
    let wide = BoundingBox::from_size(850.0, 600.0);
    assert!(BoundingBox::new(800.0, 100.0, 50.0, 50.0).overlaps(&wide));

    // Far edge exactly on the viewport's near edge.
    assert!(BoundingBox::new(-50.0, 100.0, 50.0, 50.0).overlaps(&viewport()));
    // Near edge exactly on the viewport's far edge.
    assert!(BoundingBox::new(800.0, 100.0, 50.0, 50.0).overlaps(&viewport()));
    // One unit past either edge is culled.
    assert!(!BoundingBox::new(-51.0, 100.0, 50.0, 50.0).overlaps(&viewport()));
    assert!(!BoundingBox::new(801.0, 100.0, 50.0, 50.0).overlaps(&viewport()));
}

#[test]
fn overlap_respects_viewport_origin() {
    let shifted = BoundingBox::new(100.0, 100.0, 200.0, 200.0);
    assert!(!BoundingBox::new(0.0, 150.0, 99.0, 10.0).overlaps(&shifted));
    assert!(BoundingBox::new(0.0, 150.0, 101.0, 10.0).overlaps(&shifted));
    assert!(BoundingBox::new(250.0, 250.0, 10.0, 10.0).overlaps(&shifted));
    assert!(!BoundingBox::new(301.0, 250.0, 10.0, 10.0).overlaps(&shifted));
}

#[test]
fn rgba_opacity_and_premul() {
    let c = Rgba8::rgb(255, 204, 51).with_opacity(0.5);
    assert_eq!(c.a, 128);
    assert_eq!(Rgba8::rgba(255, 255, 255, 0).to_premul_array(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::rgb(10, 20, 30).to_premul_array(), [10, 20, 30, 255]);
}
