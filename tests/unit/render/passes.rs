use super::*;
use crate::{
    compile::{CompositeOp, DrawOp, PassFx},
    foundation::core::{Affine, Canvas, Rect, Rgba8Premul},
};

#[derive(Default)]
struct MockBackend {
    calls: Vec<String>,
}

impl PassBackend for MockBackend {
    fn ensure_surface(&mut self, id: SurfaceId, _desc: &SurfaceDesc) -> PadResult<()> {
        self.calls.push(format!("ensure {}", id.0));
        Ok(())
    }

    fn clear_surface(&mut self, id: SurfaceId, rgba: [u8; 4]) -> PadResult<()> {
        self.calls.push(format!("clear {} {}", id.0, rgba[3]));
        Ok(())
    }

    fn exec_scene(&mut self, pass: &ScenePass, _assets: &PreparedAssetStore) -> PadResult<()> {
        self.calls.push(format!("scene {}", pass.target.0));
        Ok(())
    }

    fn exec_offscreen(
        &mut self,
        pass: &OffscreenPass,
        _assets: &PreparedAssetStore,
    ) -> PadResult<()> {
        self.calls.push(format!("fx {}", pass.output.0));
        Ok(())
    }

    fn exec_composite(
        &mut self,
        pass: &CompositePass,
        _assets: &PreparedAssetStore,
    ) -> PadResult<()> {
        self.calls.push(format!("over {}", pass.target.0));
        Ok(())
    }

    fn readback(&mut self, surface: SurfaceId, plan: &RenderPlan) -> PadResult<Raster> {
        self.calls.push(format!("readback {}", surface.0));
        Raster::new_transparent(plan.canvas.width, plan.canvas.height)
    }
}

fn plan() -> RenderPlan {
    let desc = SurfaceDesc {
        width: 4,
        height: 3,
    };
    RenderPlan {
        canvas: Canvas {
            width: 4,
            height: 3,
        },
        clear_rgba: Some([255, 255, 255, 255]),
        surfaces: vec![desc, desc],
        passes: vec![
            Pass::Scene(ScenePass {
                target: SurfaceId(1),
                ops: vec![DrawOp::FillRect {
                    rect: Rect::new(0.0, 0.0, 4.0, 3.0),
                    transform: Affine::IDENTITY,
                    color: Rgba8Premul::from_straight_rgba(255, 0, 0, 255),
                }],
                clear_to_transparent: true,
            }),
            Pass::Offscreen(OffscreenPass {
                input: SurfaceId(1),
                output: SurfaceId(1),
                fx: PassFx::Blur {
                    radius_px: 3,
                    sigma: 1.0,
                },
            }),
            Pass::Composite(CompositePass {
                target: SurfaceId(0),
                ops: vec![CompositeOp::Over {
                    src: SurfaceId(1),
                    opacity: 1.0,
                }],
            }),
        ],
        final_surface: SurfaceId(0),
    }
}

#[test]
fn execute_plan_calls_in_expected_order() {
    let mut backend = MockBackend::default();
    let frame = execute_plan(&mut backend, &plan(), &PreparedAssetStore::new()).unwrap();
    assert_eq!((frame.width, frame.height), (4, 3));
    assert_eq!(
        backend.calls,
        vec![
            "ensure 0",
            "ensure 1",
            "clear 0 255",
            "scene 1",
            "fx 1",
            "over 0",
            "readback 0",
        ]
    );
}

#[test]
fn missing_clear_color_clears_to_transparent() {
    let mut p = plan();
    p.clear_rgba = None;
    p.passes.clear();
    let mut backend = MockBackend::default();
    execute_plan(&mut backend, &p, &PreparedAssetStore::new()).unwrap();
    assert!(backend.calls.contains(&"clear 0 0".to_string()));
}
