//! Behavioural tests for `CameraModel` against its public contract.

use nalgebra::{DMatrix, Matrix3, Matrix4, Rotation3, Vector3};
use proptest::prelude::*;
use serde_json::json;
use sidcam_core::transform::{compose, translation};
use sidcam_core::{CameraError, CameraModel, CameraParams};

const TOL: f64 = 1e-9;

fn assert_close4(a: &Matrix4<f64>, b: &Matrix4<f64>) {
    assert!((a - b).norm() < TOL, "matrices differ:\n{a}\n{b}");
}

#[test]
fn setup_with_identity_pose() {
    let mut camera = CameraModel::new("cam0");
    let k = Matrix3::<f64>::identity();
    camera.setup(Matrix4::<f64>::identity(), k).unwrap();

    assert_eq!(camera.w2c().unwrap(), &Matrix4::identity());
    assert_eq!(camera.c2w().unwrap(), &Matrix4::identity());
    assert_eq!(camera.intrinsics().unwrap(), &k);
}

#[test]
fn derive_translation_only_pose() {
    let mut camera = CameraModel::new("cam1");
    camera.set_w2c(translation(1.0, 2.0, 3.0)).unwrap();
    camera.derive_c2w().unwrap();

    let c2w = camera.c2w().unwrap();
    assert!((c2w.fixed_view::<3, 1>(0, 3) - Vector3::new(-1.0, -2.0, -3.0)).norm() < TOL);
    assert!((c2w.fixed_view::<3, 3>(0, 0) - Matrix3::identity()).norm() < TOL);
}

#[test]
fn explicit_c2w_overrides_earlier_w2c() {
    let mut camera = CameraModel::new("cam2");
    let some_other_w2c = translation(5.0, 0.0, 0.0);
    camera.set_w2c(some_other_w2c).unwrap();

    let r = Rotation3::from_euler_angles(0.0, 0.5, 0.0).into_inner();
    let explicit_c2w = compose(&r, &Vector3::new(0.0, 1.0, -4.0));
    camera.derive_c2w_from(Some(explicit_c2w)).unwrap();

    let w2c = camera.w2c().unwrap();
    assert_close4(w2c, &explicit_c2w.try_inverse().unwrap());
    assert!((w2c - some_other_w2c).norm() > 1.0);
    assert_close4(&w2c.try_inverse().unwrap(), &explicit_c2w);
}

#[test]
fn unset_fields_fail_to_read() {
    let camera = CameraModel::new("fresh");
    assert_eq!(camera.w2c(), Err(CameraError::UnsetField("w2c")));
    assert_eq!(camera.c2w(), Err(CameraError::UnsetField("c2w")));
    assert_eq!(camera.intrinsics(), Err(CameraError::UnsetField("intrinsics")));
    assert!(matches!(camera.rotation(), Err(CameraError::UnsetField("w2c"))));
}

#[test]
fn derive_without_w2c_is_precondition_error() {
    let mut camera = CameraModel::new("fresh");
    let err = camera.derive_c2w().unwrap_err();
    assert_eq!(err, CameraError::Precondition("w2c must be set first".to_string()));
}

#[test]
fn wrong_shapes_are_rejected() {
    let mut camera = CameraModel::new("cam0");
    assert!(matches!(
        camera.set_w2c(Matrix3::<f64>::identity()),
        Err(CameraError::Shape { expected: (4, 4), actual: (3, 3), .. })
    ));
    assert!(matches!(
        camera.set_w2c(DMatrix::<f64>::zeros(4, 3)),
        Err(CameraError::Shape { expected: (4, 4), actual: (4, 3), .. })
    ));
    assert!(matches!(
        camera.set_intrinsics(Matrix4::<f64>::identity()),
        Err(CameraError::Shape { expected: (3, 3), actual: (4, 4), .. })
    ));
    // failed writes leave the field unset
    assert!(camera.w2c().is_err());
    assert!(camera.intrinsics().is_err());
}

#[test]
fn non_matrix_values_are_type_errors() {
    let mut camera = CameraModel::new("cam0");
    assert!(matches!(
        camera.set_w2c(json!("identity")),
        Err(CameraError::Type { field: "w2c", .. })
    ));
    assert!(matches!(
        camera.set_intrinsics(json!({"fx": 1.0})),
        Err(CameraError::Type { field: "intrinsics", .. })
    ));
    assert!(matches!(
        camera.set_c2w(json!([1.0, 2.0, 3.0, 4.0])),
        Err(CameraError::Type { field: "c2w", .. })
    ));
}

#[test]
fn json_matrices_are_accepted() {
    let mut camera = CameraModel::new("cam0");
    let w2c = json!([
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 2.0],
        [0.0, 0.0, 1.0, 3.0],
        [0.0, 0.0, 0.0, 1.0]
    ]);
    let k = json!([[500.0, 0.0, 320.0], [0.0, 500.0, 240.0], [0.0, 0.0, 1.0]]);
    camera.setup(&w2c, &k).unwrap();
    assert_eq!(camera.translation().unwrap(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(camera.intrinsics().unwrap()[(0, 2)], 320.0);
}

#[test]
fn setup_failure_propagates_from_failing_step() {
    let mut camera = CameraModel::new("cam0");
    let err = camera
        .setup(Matrix4::<f64>::identity(), Matrix4::<f64>::identity())
        .unwrap_err();
    assert!(matches!(err, CameraError::Shape { field: "intrinsics", .. }));
    // earlier steps stay applied
    assert!(camera.w2c().is_ok());
    assert!(camera.c2w().is_ok());
}

#[test]
fn overwrite_rederives_on_request_only() {
    let mut camera = CameraModel::new("cam0");
    camera
        .setup(translation(0.0, 0.0, 1.0), Matrix3::<f64>::identity())
        .unwrap();
    let stale_c2w = *camera.c2w().unwrap();

    camera.set_w2c(translation(0.0, 0.0, 7.0)).unwrap();
    assert_eq!(camera.c2w().unwrap(), &stale_c2w);

    camera.derive_c2w().unwrap();
    assert_close4(camera.c2w().unwrap(), &translation(0.0, 0.0, -7.0));
}

#[test]
fn params_snapshot_round_trip() {
    let mut camera = CameraModel::new("cam3");
    let r = Rotation3::from_euler_angles(0.1, 0.2, 0.3).into_inner();
    camera
        .setup(
            compose(&r, &Vector3::new(0.0, 0.0, 3.0)),
            Matrix3::new(800.0, 0.0, 320.0, 0.0, 800.0, 240.0, 0.0, 0.0, 1.0),
        )
        .unwrap();

    let params = camera.params();
    let encoded = serde_json::to_string(&params).unwrap();
    let decoded: CameraParams = serde_json::from_str(&encoded).unwrap();
    let restored = CameraModel::from_params(&decoded).unwrap();

    assert_eq!(restored.camera_id(), "cam3");
    assert_close4(restored.w2c().unwrap(), camera.w2c().unwrap());
    assert_close4(restored.c2w().unwrap(), camera.c2w().unwrap());
    assert_eq!(restored.intrinsics().unwrap(), camera.intrinsics().unwrap());
}

#[test]
fn params_with_mismatched_c2w_rejected() {
    let rows = |m: Matrix4<f64>| {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = m[(i, j)];
            }
        }
        out
    };
    let params = CameraParams {
        id: "cam5".to_string(),
        w2c: Some(rows(translation(1.0, 2.0, 3.0))),
        c2w: Some(rows(translation(9.0, 9.0, 9.0))),
        intrinsics: None,
    };
    let err = CameraModel::from_params(&params).unwrap_err();
    assert!(matches!(err, CameraError::Precondition(_)));

    // a consistent pair is accepted and keeps the inverse law
    let params = CameraParams {
        c2w: Some(rows(translation(-1.0, -2.0, -3.0))),
        ..params
    };
    let camera = CameraModel::from_params(&params).unwrap();
    assert_close4(&(camera.w2c().unwrap() * camera.c2w().unwrap()), &Matrix4::identity());
}

#[test]
fn params_with_only_c2w_recompute_w2c() {
    let params = CameraParams {
        id: "cam4".to_string(),
        w2c: None,
        c2w: Some([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, -5.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        intrinsics: None,
    };
    let camera = CameraModel::from_params(&params).unwrap();
    assert_close4(camera.w2c().unwrap(), &translation(0.0, 0.0, 5.0));
    assert!(camera.intrinsics().is_err());
}

fn rigid_transform() -> impl Strategy<Value = Matrix4<f64>> {
    (
        -3.1f64..3.1,
        -1.5f64..1.5,
        -3.1f64..3.1,
        prop::array::uniform3(-100.0f64..100.0),
    )
        .prop_map(|(roll, pitch, yaw, t)| {
            let r = Rotation3::from_euler_angles(roll, pitch, yaw).into_inner();
            compose(&r, &Vector3::from(t))
        })
}

proptest! {
    #[test]
    fn derived_c2w_inverts_w2c(w2c in rigid_transform()) {
        let mut camera = CameraModel::new("prop");
        camera.set_w2c(w2c).unwrap();
        camera.derive_c2w().unwrap();
        let product = camera.w2c().unwrap() * camera.c2w().unwrap();
        prop_assert!((product - Matrix4::identity()).norm() < 1e-9);
    }

    #[test]
    fn explicit_c2w_round_trips(c2w in rigid_transform()) {
        let mut camera = CameraModel::new("prop");
        camera.set_c2w(c2w).unwrap();
        let w2c = camera.w2c().unwrap();
        prop_assert!((w2c * c2w - Matrix4::identity()).norm() < 1e-9);
        prop_assert!((w2c.try_inverse().unwrap() - c2w).norm() < 1e-9);
    }
}
