//! Pixel-readback conformance tests for the CPU rasterizer: the scenarios
//! the software backend exists to make checkable, driven directly against
//! `raster::rasterize_triangle` rather than through the full device/queue
//! lifecycle a real draw call would go through.

use wgx_backend_soft::raster::{rasterize_triangle, FrameBuffer, RasterState, Vertex, Viewport};
use wgx_hal::image::CompareFunction;
use wgx_hal::pso::{BlendState, DepthStencilState, PrimitiveState, StencilFaceState, StencilOperation, StencilState};

fn viewport(w: u32, h: u32) -> Viewport {
    Viewport { x: 0.0, y: 0.0, w: w as f32, h: h as f32 }
}

fn clip_from_screen(x: f32, y: f32, depth: f32, vw: f32, vh: f32) -> [f32; 4] {
    // Inverse of `project`'s formula, for w = 1: clip.xy is NDC, clip.z is
    // NDC z scaled back from the stored depth.
    let ndc_x = (x / vw) * 2.0 - 1.0;
    let ndc_y = 1.0 - (y / vh) * 2.0;
    let ndc_z = (depth - 0.5) * 2.0;
    [ndc_x, ndc_y, ndc_z, 1.0]
}

fn vertex(x: f32, y: f32, depth: f32, vw: f32, vh: f32, color: [f32; 4]) -> Vertex {
    Vertex { clip: clip_from_screen(x, y, depth, vw, vh), color }
}

fn pixel(color: &[u8], width: u32, x: u32, y: u32) -> (u8, u8, u8, u8) {
    let idx = (y as usize * width as usize + x as usize) * 4;
    (color[idx], color[idx + 1], color[idx + 2], color[idx + 3])
}

/// Scenario 5: top-left rule. A solid red triangle on a cleared 100x100
/// framebuffer covers (30,25) but not (0,0).
#[test]
fn top_left_rule_covers_interior_not_exterior() {
    let (w, h) = (100u32, 100u32);
    let mut color = vec![0u8; (w * h * 4) as usize];
    for px in color.chunks_exact_mut(4) {
        px[3] = 255;
    }
    let red = [1.0, 0.0, 0.0, 1.0];
    let v0 = vertex(10.0, 10.0, 0.5, w as f32, h as f32, red);
    let v1 = vertex(50.0, 10.0, 0.5, w as f32, h as f32, red);
    let v2 = vertex(30.0, 50.0, 0.5, w as f32, h as f32, red);
    let state = RasterState {
        viewport: viewport(w, h),
        scissor: None,
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        blend: None,
        stencil_reference: 0,
        blend_constant: [0.0; 4],
    };
    {
        let mut fb = FrameBuffer { width: w, height: h, color: Some(&mut color), depth: None, stencil: None };
        rasterize_triangle(&mut fb, v0, v1, v2, &state);
    }

    assert_eq!(pixel(&color, w, 30, 25), (255, 0, 0, 255));
    assert_eq!(pixel(&color, w, 0, 0), (0, 0, 0, 255));
}

/// Scenario 6: depth occlusion. Whichever triangle has the lesser depth
/// wins the center pixel regardless of draw order.
#[test]
fn depth_test_keeps_the_nearer_fragment_regardless_of_draw_order() {
    let (w, h) = (100u32, 100u32);
    let blue = [0.0, 0.0, 1.0, 1.0];
    let red = [1.0, 0.0, 0.0, 1.0];
    let tri = |depth: f32, col: [f32; 4], w: f32, h: f32| {
        (
            vertex(0.0, 0.0, depth, w, h, col),
            vertex(100.0, 0.0, depth, w, h, col),
            vertex(50.0, 100.0, depth, w, h, col),
        )
    };
    let state = RasterState {
        viewport: viewport(w, h),
        scissor: None,
        primitive: PrimitiveState::default(),
        depth_stencil: Some(DepthStencilState {
            format: wgx_hal::format::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
        }),
        blend: None,
        stencil_reference: 0,
        blend_constant: [0.0; 4],
    };

    // Blue at z=0.7 drawn first, red at z=0.3 drawn second: red wins.
    let mut color = vec![0u8; (w * h * 4) as usize];
    let mut depth = vec![1.0f32; (w * h) as usize];
    {
        let mut fb = FrameBuffer { width: w, height: h, color: Some(&mut color), depth: Some(&mut depth), stencil: None };
        let (a0, a1, a2) = tri(0.7, blue, w as f32, h as f32);
        rasterize_triangle(&mut fb, a0, a1, a2, &state);
        let (b0, b1, b2) = tri(0.3, red, w as f32, h as f32);
        rasterize_triangle(&mut fb, b0, b1, b2, &state);
    }
    assert_eq!(pixel(&color, w, 50, 50), (255, 0, 0, 255));

    // Swapped order: red at z=0.3 drawn first, blue at z=0.7 second; blue
    // fails the depth test and red still wins.
    let mut color = vec![0u8; (w * h * 4) as usize];
    let mut depth = vec![1.0f32; (w * h) as usize];
    {
        let mut fb = FrameBuffer { width: w, height: h, color: Some(&mut color), depth: Some(&mut depth), stencil: None };
        let (a0, a1, a2) = tri(0.3, red, w as f32, h as f32);
        rasterize_triangle(&mut fb, a0, a1, a2, &state);
        let (b0, b1, b2) = tri(0.7, blue, w as f32, h as f32);
        rasterize_triangle(&mut fb, b0, b1, b2, &state);
    }
    assert_eq!(pixel(&color, w, 50, 50), (255, 0, 0, 255));
}

/// Scenario 7: source-over blending. A 50%-transparent red triangle over
/// an opaque green background lands in the expected channel range inside
/// the triangle and leaves the background untouched outside it.
#[test]
fn source_over_blend_mixes_inside_the_triangle_only() {
    let (w, h) = (100u32, 100u32);
    let mut color = vec![0u8; (w * h * 4) as usize];
    for px in color.chunks_exact_mut(4) {
        px[1] = 255;
        px[3] = 255;
    }
    let translucent_red = [1.0, 0.0, 0.0, 0.5];
    let v0 = vertex(10.0, 10.0, 0.5, w as f32, h as f32, translucent_red);
    let v1 = vertex(90.0, 10.0, 0.5, w as f32, h as f32, translucent_red);
    let v2 = vertex(50.0, 90.0, 0.5, w as f32, h as f32, translucent_red);
    let state = RasterState {
        viewport: viewport(w, h),
        scissor: None,
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        blend: Some(BlendState::ALPHA_BLENDING),
        stencil_reference: 0,
        blend_constant: [0.0; 4],
    };
    {
        let mut fb = FrameBuffer { width: w, height: h, color: Some(&mut color), depth: None, stencil: None };
        rasterize_triangle(&mut fb, v0, v1, v2, &state);
    }

    let (r, g, _b, _a) = pixel(&color, w, 50, 40);
    assert!((100..=156).contains(&r), "red channel {r} out of range");
    assert!((100..=156).contains(&g), "green channel {g} out of range");
    assert_eq!(pixel(&color, w, 5, 5), (0, 255, 0, 255));
}

/// Two triangles split a square along their shared diagonal; every pixel
/// in the square is covered by exactly one of them, confirmed by
/// incrementing a stencil counter on every passing fragment.
#[test]
fn shared_edge_is_covered_by_exactly_one_triangle() {
    let (w, h) = (40u32, 40u32);
    let mut stencil = vec![0u8; (w * h) as usize];
    let count_face = StencilFaceState {
        compare: CompareFunction::Always,
        fail_op: StencilOperation::Keep,
        depth_fail_op: StencilOperation::Keep,
        pass_op: StencilOperation::IncrementClamp,
    };
    let state = RasterState {
        viewport: viewport(w, h),
        scissor: None,
        primitive: PrimitiveState::default(),
        depth_stencil: Some(DepthStencilState {
            format: wgx_hal::format::TextureFormat::Depth32Float,
            depth_write_enabled: false,
            depth_compare: CompareFunction::Always,
            stencil: StencilState { front: count_face, back: count_face, read_mask: !0, write_mask: !0 },
        }),
        blend: None,
        stencil_reference: 1,
        blend_constant: [0.0; 4],
    };
    let white = [1.0, 1.0, 1.0, 1.0];
    {
        let mut fb = FrameBuffer { width: w, height: h, color: None, depth: None, stencil: Some(&mut stencil) };
        let a0 = vertex(0.0, 0.0, 0.5, w as f32, h as f32, white);
        let a1 = vertex(40.0, 0.0, 0.5, w as f32, h as f32, white);
        let a2 = vertex(0.0, 40.0, 0.5, w as f32, h as f32, white);
        rasterize_triangle(&mut fb, a0, a1, a2, &state);
        let b0 = vertex(40.0, 0.0, 0.5, w as f32, h as f32, white);
        let b1 = vertex(40.0, 40.0, 0.5, w as f32, h as f32, white);
        let b2 = vertex(0.0, 40.0, 0.5, w as f32, h as f32, white);
        rasterize_triangle(&mut fb, b0, b1, b2, &state);
    }

    for count in &stencil {
        assert_eq!(*count, 1, "every pixel of the split square must be covered exactly once");
    }
}

/// For a triangle whose three vertices share the same w and the same
/// interpolated depth value, the rasterizer's barycentric weights must sum
/// to 1: any drift shows up directly as a wrong interpolated depth.
#[test]
fn barycentric_weights_sum_to_one() {
    let (w, h) = (100u32, 100u32);
    let mut depth = vec![2.0f32; (w * h) as usize];
    let uniform_depth = 0.75;
    let color = [1.0, 1.0, 1.0, 1.0];
    let v0 = vertex(10.0, 10.0, uniform_depth, w as f32, h as f32, color);
    let v1 = vertex(90.0, 10.0, uniform_depth, w as f32, h as f32, color);
    let v2 = vertex(50.0, 90.0, uniform_depth, w as f32, h as f32, color);
    let state = RasterState {
        viewport: viewport(w, h),
        scissor: None,
        primitive: PrimitiveState::default(),
        depth_stencil: Some(DepthStencilState {
            format: wgx_hal::format::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Always,
            stencil: StencilState::default(),
        }),
        blend: None,
        stencil_reference: 0,
        blend_constant: [0.0; 4],
    };
    {
        let mut fb = FrameBuffer { width: w, height: h, color: None, depth: Some(&mut depth), stencil: None };
        rasterize_triangle(&mut fb, v0, v1, v2, &state);
    }

    let idx = 40 * w as usize + 50;
    assert!((depth[idx] - uniform_depth).abs() <= 1e-2, "interpolated depth {} should equal the uniform vertex depth {}", depth[idx], uniform_depth);
}
