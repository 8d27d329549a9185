//! The CPU triangle rasterizer (spec §4.5): clip, bin into 8×8 tiles, scan
//! each tile with incremental edge functions under the top-left fill rule,
//! interpolate perspective-correctly, then test/write depth, stencil, and
//! blend.
//!
//! The rasterizer's job is the fixed-function pipeline stage, not shading:
//! WGSL/SPIR-V/GLSL translation is an external collaborator this repository
//! does not implement (spec §6), so there is no shading language VM to run
//! fragments through. The "fragment shader" here is the fixed, documented
//! pass-through every testable property in spec §8 needs and nothing more:
//! it forwards the rasterizer's perspective-correct-interpolated vertex
//! color unchanged. See `DESIGN.md`.

use wgx_hal::image::CompareFunction;
use wgx_hal::pso::{BlendComponent, BlendFactor, BlendOperation, BlendState, DepthStencilState, PrimitiveState, StencilFaceState, StencilState};

pub const TILE_SIZE: u32 = 8;

/// Wraps a raw pointer so it can cross the rayon thread pool. Sound only
/// because callers hand out disjoint tiles: no two workers ever dereference
/// the same address.
#[derive(Clone, Copy)]
struct SyncMutPtr<T>(*mut T);
unsafe impl<T> Send for SyncMutPtr<T> {}
unsafe impl<T> Sync for SyncMutPtr<T> {}

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    /// Clip-space position.
    pub clip: [f32; 4],
    /// A color attribute, carried through unchanged to the fragment stage.
    pub color: [f32; 4],
}

pub struct FrameBuffer<'a> {
    pub width: u32,
    pub height: u32,
    pub color: Option<&'a mut [u8]>,
    pub depth: Option<&'a mut [f32]>,
    pub stencil: Option<&'a mut [u8]>,
}

#[derive(Clone, Copy)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Clone, Copy)]
pub struct Scissor {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

pub struct RasterState {
    pub viewport: Viewport,
    pub scissor: Option<Scissor>,
    pub primitive: PrimitiveState,
    pub depth_stencil: Option<DepthStencilState>,
    pub blend: Option<BlendState>,
    pub stencil_reference: u32,
    pub blend_constant: [f32; 4],
}

/// One point after clip-to-screen projection, ready for rasterization.
#[derive(Clone, Copy)]
struct Projected {
    /// Screen-space x/y, plus the depth value written to the depth buffer.
    x: f32,
    y: f32,
    depth: f32,
    /// `1/w`, kept for perspective-correct interpolation.
    inv_w: f32,
    color: [f32; 4],
}

/// Clip `poly` (a fan of clip-space `Vertex`) against one plane, keeping
/// the half-space `dist(v) >= 0`. Sutherland–Hodgman.
fn clip_against<F: Fn(&Vertex) -> f32>(poly: &[Vertex], dist: F) -> Vec<Vertex> {
    if poly.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(poly.len() + 1);
    for i in 0..poly.len() {
        let cur = poly[i];
        let prev = poly[(i + poly.len() - 1) % poly.len()];
        let cur_d = dist(&cur);
        let prev_d = dist(&prev);
        if cur_d >= 0.0 {
            if prev_d < 0.0 {
                out.push(lerp_vertex(&prev, &cur, prev_d / (prev_d - cur_d)));
            }
            out.push(cur);
        } else if prev_d >= 0.0 {
            out.push(lerp_vertex(&prev, &cur, prev_d / (prev_d - cur_d)));
        }
    }
    out
}

fn lerp_vertex(a: &Vertex, b: &Vertex, t: f32) -> Vertex {
    let l = |x: f32, y: f32| x + (y - x) * t;
    Vertex {
        clip: [l(a.clip[0], b.clip[0]), l(a.clip[1], b.clip[1]), l(a.clip[2], b.clip[2]), l(a.clip[3], b.clip[3])],
        color: [l(a.color[0], b.color[0]), l(a.color[1], b.color[1]), l(a.color[2], b.color[2]), l(a.color[3], b.color[3])],
    }
}

/// Clip a triangle against the six canonical clip-space planes, yielding
/// zero or more triangles (a convex polygon of up to 9 vertices, fanned).
fn clip_triangle(v0: Vertex, v1: Vertex, v2: Vertex) -> Vec<[Vertex; 3]> {
    let mut poly = vec![v0, v1, v2];
    let planes: [fn(&Vertex) -> f32; 6] = [
        |v| v.clip[3] + v.clip[0],
        |v| v.clip[3] - v.clip[0],
        |v| v.clip[3] + v.clip[1],
        |v| v.clip[3] - v.clip[1],
        |v| v.clip[3] + v.clip[2],
        |v| v.clip[3] - v.clip[2],
    ];
    for plane in planes {
        poly = clip_against(&poly, plane);
        if poly.len() < 3 {
            return Vec::new();
        }
    }
    (1..poly.len() - 1)
        .map(|i| [poly[0], poly[i], poly[i + 1]])
        .collect()
}

fn project(v: &Vertex, viewport: &Viewport) -> Projected {
    let inv_w = 1.0 / v.clip[3];
    let ndc_x = v.clip[0] * inv_w;
    let ndc_y = v.clip[1] * inv_w;
    let ndc_z = v.clip[2] * inv_w;
    Projected {
        x: viewport.x + (ndc_x * 0.5 + 0.5) * viewport.w,
        y: viewport.y + (1.0 - (ndc_y * 0.5 + 0.5)) * viewport.h,
        depth: ndc_z * 0.5 + 0.5,
        inv_w,
        color: v.color,
    }
}

fn apply_factor(factor: BlendFactor, src: [f32; 4], dst: [f32; 4], constant: [f32; 4], channel: usize) -> f32 {
    match factor {
        BlendFactor::Zero => 0.0,
        BlendFactor::One => 1.0,
        BlendFactor::Src => src[channel],
        BlendFactor::OneMinusSrc => 1.0 - src[channel],
        BlendFactor::Dst => dst[channel],
        BlendFactor::OneMinusDst => 1.0 - dst[channel],
        BlendFactor::SrcAlpha => src[3],
        BlendFactor::OneMinusSrcAlpha => 1.0 - src[3],
        BlendFactor::DstAlpha => dst[3],
        BlendFactor::OneMinusDstAlpha => 1.0 - dst[3],
        BlendFactor::Constant => constant[channel],
        BlendFactor::OneMinusConstant => 1.0 - constant[channel],
        BlendFactor::SrcAlphaSaturated => src[3].min(1.0 - dst[3]),
    }
}

fn apply_op(op: BlendOperation, src: f32, dst: f32) -> f32 {
    match op {
        BlendOperation::Add => src + dst,
        BlendOperation::Subtract => src - dst,
        BlendOperation::ReverseSubtract => dst - src,
        BlendOperation::Min => src.min(dst),
        BlendOperation::Max => src.max(dst),
    }
}

fn blend_channel(comp: &BlendComponent, src: [f32; 4], dst: [f32; 4], constant: [f32; 4], channel: usize) -> f32 {
    let s = src[channel] * apply_factor(comp.src_factor, src, dst, constant, channel);
    let d = dst[channel] * apply_factor(comp.dst_factor, src, dst, constant, channel);
    apply_op(comp.operation, s, d).clamp(0.0, 1.0)
}

fn blend(state: &BlendState, src: [f32; 4], dst: [f32; 4], constant: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0; 4];
    out[0] = blend_channel(&state.color, src, dst, constant, 0);
    out[1] = blend_channel(&state.color, src, dst, constant, 1);
    out[2] = blend_channel(&state.color, src, dst, constant, 2);
    out[3] = blend_channel(&state.alpha, src, dst, constant, 3);
    out
}

fn compare(func: CompareFunction, a: f32, b: f32) -> bool {
    match func {
        CompareFunction::Never => false,
        CompareFunction::Less => a < b,
        CompareFunction::Equal => a == b,
        CompareFunction::LessEqual => a <= b,
        CompareFunction::Greater => a > b,
        CompareFunction::NotEqual => a != b,
        CompareFunction::GreaterEqual => a >= b,
        CompareFunction::Always => true,
    }
}

fn stencil_op(op: wgx_hal::pso::StencilOperation, stored: u8, reference: u8) -> u8 {
    use wgx_hal::pso::StencilOperation::*;
    match op {
        Keep => stored,
        Zero => 0,
        Replace => reference,
        IncrementClamp => stored.saturating_add(1),
        DecrementClamp => stored.saturating_sub(1),
        Invert => !stored,
        IncrementWrap => stored.wrapping_add(1),
        DecrementWrap => stored.wrapping_sub(1),
    }
}

fn face_state(stencil: &StencilState, front_facing: bool) -> &StencilFaceState {
    if front_facing { &stencil.front } else { &stencil.back }
}

/// Rasterize one triangle (already in clip space) into `fb` under `state`,
/// parallelizing across 8×8 tiles with rayon.
pub fn rasterize_triangle(fb: &mut FrameBuffer, v0: Vertex, v1: Vertex, v2: Vertex, state: &RasterState) {
    for [c0, c1, c2] in clip_triangle(v0, v1, v2) {
        rasterize_clipped(fb, c0, c1, c2, state);
    }
}

fn rasterize_clipped(fb: &mut FrameBuffer, v0: Vertex, v1: Vertex, v2: Vertex, state: &RasterState) {
    let p0 = project(&v0, &state.viewport);
    let p1 = project(&v1, &state.viewport);
    let p2 = project(&v2, &state.viewport);

    // Twice the signed area; CCW-wound triangles are positive.
    let area = (p1.x - p0.x) * (p2.y - p0.y) - (p1.y - p0.y) * (p2.x - p0.x);
    if area == 0.0 {
        return; // degenerate
    }
    let is_ccw = area > 0.0;
    let front_facing = is_ccw == (state.primitive.front_face == wgx_hal::pso::FrontFace::Ccw);
    match state.primitive.cull_mode {
        wgx_hal::pso::CullMode::None => {}
        wgx_hal::pso::CullMode::Front if front_facing => return,
        wgx_hal::pso::CullMode::Back if !front_facing => return,
        _ => {}
    }

    // Normalize winding to CCW so the inside test (`>= 0` on every edge) is
    // uniform regardless of the triangle's original winding.
    let (p0, p1, p2) = if is_ccw { (p0, p1, p2) } else { (p0, p2, p1) };
    let area = area.abs();

    let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as u32;
    let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as u32;
    let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as u32).min(fb.width.saturating_sub(1));
    let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as u32).min(fb.height.saturating_sub(1));
    if min_x > max_x || min_y > max_y {
        return;
    }

    let scissor = state.scissor.unwrap_or(Scissor { x: 0, y: 0, w: fb.width, h: fb.height });
    let min_x = min_x.max(scissor.x);
    let min_y = min_y.max(scissor.y);
    let max_x = max_x.min((scissor.x + scissor.w).saturating_sub(1));
    let max_y = max_y.min((scissor.y + scissor.h).saturating_sub(1));
    if min_x > max_x || min_y > max_y {
        return;
    }

    let tiles_x = (min_x / TILE_SIZE)..=(max_x / TILE_SIZE);
    let tiles_y = (min_y / TILE_SIZE)..=(max_y / TILE_SIZE);
    let tile_list: Vec<(u32, u32)> = tiles_y
        .flat_map(|ty| tiles_x.clone().map(move |tx| (tx, ty)))
        .collect();

    let width = fb.width as usize;
    let color = fb.color.as_deref_mut();
    let depth = fb.depth.as_deref_mut();
    let stencil = fb.stencil.as_deref_mut();

    // Tiles partition the framebuffer, so disjoint tiles never touch the
    // same pixel; that's what lets raw pointers captured below cross the
    // rayon thread pool despite not being `Send`/`Sync` on their own.
    use rayon::prelude::*;
    let color_ptr = color.map(|c| SyncMutPtr(c.as_mut_ptr()));
    let depth_ptr = depth.map(|d| SyncMutPtr(d.as_mut_ptr()));
    let stencil_ptr = stencil.map(|s| SyncMutPtr(s.as_mut_ptr()));

    tile_list.into_par_iter().for_each(|(tx, ty)| {
        let color_ptr = color_ptr.as_ref().map(|p| p.0);
        let depth_ptr = depth_ptr.as_ref().map(|p| p.0);
        let stencil_ptr = stencil_ptr.as_ref().map(|p| p.0);
        let tile_min_x = (tx * TILE_SIZE).max(min_x);
        let tile_min_y = (ty * TILE_SIZE).max(min_y);
        let tile_max_x = ((tx + 1) * TILE_SIZE - 1).min(max_x);
        let tile_max_y = ((ty + 1) * TILE_SIZE - 1).min(max_y);

        for py in tile_min_y..=tile_max_y {
            for px in tile_min_x..=tile_max_x {
                let x = px as f32 + 0.5;
                let y = py as f32 + 0.5;

                let e01 = edge(&p0, &p1, x, y);
                let e12 = edge(&p1, &p2, x, y);
                let e20 = edge(&p2, &p0, x, y);

                if !inside(e01, &p0, &p1) || !inside(e12, &p1, &p2) || !inside(e20, &p2, &p0) {
                    continue;
                }

                let b0 = e12 / area;
                let b1 = e20 / area;
                let b2 = e01 / area;

                let depth_val = b0 * p0.depth + b1 * p1.depth + b2 * p2.depth;
                let persp_w = b0 * p0.inv_w + b1 * p1.inv_w + b2 * p2.inv_w;
                let interp = |c: usize| {
                    (b0 * p0.color[c] * p0.inv_w + b1 * p1.color[c] * p1.inv_w + b2 * p2.color[c] * p2.inv_w) / persp_w
                };
                let fragment_color = [interp(0), interp(1), interp(2), interp(3)];

                let idx = py as usize * width + px as usize;

                let stored_stencil = stencil_ptr.map(|p| unsafe { *p.add(idx) }).unwrap_or(0);
                let face = front_facing;
                let (stencil_pass, new_stencil) = match &state.depth_stencil {
                    Some(ds) if ds.stencil.is_enabled() => {
                        let fs = face_state(&ds.stencil, face);
                        let read = stored_stencil & (ds.stencil.read_mask as u8);
                        let reference = (state.stencil_reference as u8) & (ds.stencil.read_mask as u8);
                        let pass = compare(fs.compare, reference as f32, read as f32);
                        (pass, pass)
                    }
                    _ => (true, true),
                };
                let _ = new_stencil;

                if !stencil_pass {
                    if let (Some(ds), Some(p)) = (&state.depth_stencil, stencil_ptr) {
                        let fs = face_state(&ds.stencil, face);
                        let written = stencil_op(fs.fail_op, stored_stencil, state.stencil_reference as u8) & (ds.stencil.write_mask as u8);
                        unsafe { *p.add(idx) = written };
                    }
                    continue;
                }

                let depth_pass = match &state.depth_stencil {
                    Some(ds) => match depth_ptr {
                        Some(p) => {
                            let stored = unsafe { *p.add(idx) };
                            compare(ds.depth_compare, depth_val, stored)
                        }
                        None => true,
                    },
                    None => true,
                };

                if !depth_pass {
                    if let (Some(ds), Some(p)) = (&state.depth_stencil, stencil_ptr) {
                        let fs = face_state(&ds.stencil, face);
                        let written = stencil_op(fs.depth_fail_op, stored_stencil, state.stencil_reference as u8) & (ds.stencil.write_mask as u8);
                        unsafe { *p.add(idx) = written };
                    }
                    continue;
                }

                if let (Some(ds), Some(p)) = (&state.depth_stencil, stencil_ptr) {
                    let fs = face_state(&ds.stencil, face);
                    let written = stencil_op(fs.pass_op, stored_stencil, state.stencil_reference as u8) & (ds.stencil.write_mask as u8);
                    unsafe { *p.add(idx) = written };
                }
                if let Some(ds) = &state.depth_stencil {
                    if ds.depth_write_enabled {
                        if let Some(p) = depth_ptr {
                            unsafe { *p.add(idx) = depth_val };
                        }
                    }
                }

                if let Some(p) = color_ptr {
                    let out = match &state.blend {
                        Some(blend_state) => {
                            let dst = unsafe {
                                [
                                    *p.add(idx * 4) as f32 / 255.0,
                                    *p.add(idx * 4 + 1) as f32 / 255.0,
                                    *p.add(idx * 4 + 2) as f32 / 255.0,
                                    *p.add(idx * 4 + 3) as f32 / 255.0,
                                ]
                            };
                            blend(blend_state, fragment_color, dst, state.blend_constant)
                        }
                        None => fragment_color,
                    };
                    unsafe {
                        *p.add(idx * 4) = (out[0].clamp(0.0, 1.0) * 255.0).round() as u8;
                        *p.add(idx * 4 + 1) = (out[1].clamp(0.0, 1.0) * 255.0).round() as u8;
                        *p.add(idx * 4 + 2) = (out[2].clamp(0.0, 1.0) * 255.0).round() as u8;
                        *p.add(idx * 4 + 3) = (out[3].clamp(0.0, 1.0) * 255.0).round() as u8;
                    }
                }
            }
        }
    });
}

fn edge(a: &Projected, b: &Projected, x: f32, y: f32) -> f32 {
    (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x)
}

/// Top-left fill rule: a pixel exactly on a shared edge is inside for
/// exactly one of the two triangles that share it — the one for which the
/// edge is "top" (horizontal, going left) or "left" (going up).
fn inside(edge_value: f32, a: &Projected, b: &Projected) -> bool {
    if edge_value > 0.0 {
        return true;
    }
    if edge_value < 0.0 {
        return false;
    }
    let is_top = a.y == b.y && b.x < a.x;
    let is_left = b.y < a.y;
    is_top || is_left
}
