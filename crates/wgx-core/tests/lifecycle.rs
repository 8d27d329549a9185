//! End-to-end exercises of the resource hub, queue upload/readback, and
//! command recording against the software backend, mirroring the way the
//! teacher's own `tests/handle.rs` drives its resource-manager lifecycle
//! with a mock `Resources` impl instead of a real GPU.

use std::borrow::Cow;
use std::time::Duration;

use wgx_core::device::{ComputePipelineDesc, ProgrammableStageDesc, RenderPipelineDesc};
use wgx_core::error::Error;
use wgx_hal::buffer::{BufferDescriptor, BufferUses};
use wgx_hal::command::{ClearColor, LoadOp, StoreOp};
use wgx_hal::format::TextureFormat;
use wgx_hal::image::{Extent3d, SubresourceRange, TextureDescriptor, TextureDimension, TextureUses, TextureViewDescriptor};
use wgx_hal::limits::{Features, Limits};
use wgx_hal::pso::{
    BindGroupLayoutDescriptor, ColorTargetState, ColorWrites, PrimitiveState, ShaderModuleDescriptor, ShaderSource, ShaderStages,
    VertexBufferLayout,
};
use wgx_hal::query::{QuerySetDescriptor, QueryType};
use wgx_hal::window::InstanceFlags;
use wgx_backend_soft::SoftApi;

fn open_device() -> (std::sync::Arc<wgx_core::Device<SoftApi>>, wgx_core::Queue<SoftApi>) {
    let instance = wgx_core::Instance::<SoftApi>::new("lifecycle-tests", InstanceFlags::empty()).unwrap();
    let adapters = instance.enumerate_adapters(None);
    let adapter = adapters.into_iter().next().expect("the software backend always exposes one adapter");
    adapter.request_device("test device", Features::empty(), Limits::default()).unwrap()
}

#[test]
fn buffer_write_then_read_round_trips() {
    let (device, queue) = open_device();
    let id = device
        .create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed("scratch")),
            size: 16,
            usage: BufferUses::COPY_DST | BufferUses::MAP_READ | BufferUses::MAP_WRITE,
            mapped_at_creation: false,
        })
        .unwrap();

    let payload = [1u8, 2, 3, 4, 5, 6, 7, 8];
    queue.write_buffer(id, &device, 4, &payload).unwrap();

    let mut out = [0u8; 8];
    queue.read_buffer(id, &device, 4, &mut out).unwrap();
    assert_eq!(out, payload);

    device.destroy_buffer(id).unwrap();
}

#[test]
fn stale_id_is_rejected_after_destroy() {
    let (device, queue) = open_device();
    let id = device
        .create_buffer(&BufferDescriptor {
            label: None,
            size: 4,
            usage: BufferUses::COPY_DST,
            mapped_at_creation: false,
        })
        .unwrap();

    device.destroy_buffer(id).unwrap();

    let err = queue.write_buffer(id, &device, 0, &[0u8; 4]).unwrap_err();
    assert!(matches!(err, Error::Released));

    // A second destroy of the same (now-stale) id is a validation error,
    // not a double-free: the registry slot generation has already moved on.
    let err = device.destroy_buffer(id).unwrap_err();
    assert!(matches!(err, Error::Released) || matches!(err, Error::Validation(_)));
}

#[test]
fn texture_view_subresource_range_is_checked() {
    let (device, _queue) = open_device();
    let texture_id = device
        .create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("color target")),
            size: Extent3d { width: 64, height: 64, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUses::COLOR_TARGET | TextureUses::COPY_SRC,
        })
        .unwrap();

    let range = SubresourceRange { base_mip_level: 0, mip_level_count: 1, base_array_layer: 0, array_layer_count: 1 };
    assert!(range.within(1, 1));
    device
        .create_texture_view(texture_id, &TextureViewDescriptor { label: None, format: TextureFormat::Rgba8Unorm, range })
        .unwrap();

    // A range outside the parent's own mip/layer extent is rejected before
    // the view ever reaches the backend.
    let out_of_range = SubresourceRange { base_mip_level: 2, mip_level_count: 1, base_array_layer: 0, array_layer_count: 1 };
    assert!(!out_of_range.within(1, 1));
    let err = device
        .create_texture_view(
            texture_id,
            &TextureViewDescriptor { label: None, format: TextureFormat::Rgba8Unorm, range: out_of_range },
        )
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn compute_pipeline_is_rejected_on_a_backend_without_compute_shaders() {
    let (device, _queue) = open_device();

    let module = device
        .create_shader_module(&ShaderModuleDescriptor {
            label: Some(Cow::Borrowed("noop.comp")),
            source: ShaderSource::Glsl { source: Cow::Borrowed("#version 450\nvoid main() {}"), stage: ShaderStages::COMPUTE },
        })
        .unwrap();
    let layout = device.create_pipeline_layout(None, &[]).unwrap();

    let err = device
        .create_compute_pipeline(&ComputePipelineDesc {
            label: None,
            layout,
            compute: ProgrammableStageDesc { module, entry_point: "main".to_string() },
        })
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn error_scope_captures_a_validation_error() {
    let (device, _queue) = open_device();
    device.push_error_scope(wgx_core::error::ErrorFilter::Validation);

    let layout = device.create_pipeline_layout(None, &[]).unwrap();
    let module = device
        .create_shader_module(&ShaderModuleDescriptor {
            label: None,
            source: ShaderSource::Glsl { source: Cow::Borrowed("#version 450\nvoid main() {}"), stage: ShaderStages::COMPUTE },
        })
        .unwrap();
    let _ = device.create_compute_pipeline(&ComputePipelineDesc {
        label: None,
        layout,
        compute: ProgrammableStageDesc { module, entry_point: "main".to_string() },
    });

    let captured = device.pop_error_scope().unwrap();
    assert!(matches!(captured, Some(Error::Validation(_))));

    // Popping again with nothing left open is itself a validation error.
    assert!(device.pop_error_scope().is_err());
}

#[test]
fn render_pass_draws_a_triangle_and_submits() {
    let (device, queue) = open_device();

    let color_id = device
        .create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("color")),
            size: Extent3d { width: 4, height: 4, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUses::COLOR_TARGET,
        })
        .unwrap();
    let color_view = device
        .create_texture_view(
            color_id,
            &TextureViewDescriptor {
                label: None,
                format: TextureFormat::Rgba8Unorm,
                range: SubresourceRange { base_mip_level: 0, mip_level_count: 1, base_array_layer: 0, array_layer_count: 1 },
            },
        )
        .unwrap();

    let vertex_buffer = device
        .create_buffer(&BufferDescriptor {
            label: None,
            size: 3 * 3 * std::mem::size_of::<f32>() as u64,
            usage: BufferUses::VERTEX | BufferUses::COPY_DST,
            mapped_at_creation: false,
        })
        .unwrap();
    let positions: [f32; 9] = [-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0];
    queue.write_buffer(vertex_buffer, &device, 0, bytemuck_cast(&positions)).unwrap();

    let vertex_module = device
        .create_shader_module(&ShaderModuleDescriptor {
            label: Some(Cow::Borrowed("triangle.vert")),
            source: ShaderSource::Glsl { source: Cow::Borrowed("#version 450\nvoid main() {}"), stage: ShaderStages::VERTEX },
        })
        .unwrap();
    let fragment_module = device
        .create_shader_module(&ShaderModuleDescriptor {
            label: Some(Cow::Borrowed("triangle.frag")),
            source: ShaderSource::Glsl { source: Cow::Borrowed("#version 450\nvoid main() {}"), stage: ShaderStages::FRAGMENT },
        })
        .unwrap();
    let layout = device.create_pipeline_layout(Some("empty"), &[]).unwrap();

    let pipeline = device
        .create_render_pipeline(&RenderPipelineDesc {
            label: Some("triangle"),
            layout,
            vertex: ProgrammableStageDesc { module: vertex_module, entry_point: "main".to_string() },
            vertex_buffers: &[VertexBufferLayout {
                array_stride: 3 * std::mem::size_of::<f32>() as u64,
                step_mode: wgx_hal::pso::VertexStepMode::Vertex,
                attributes: Cow::Borrowed(&[wgx_hal::pso::VertexAttribute {
                    format: wgx_hal::pso::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                }]),
            }],
            fragment: Some(ProgrammableStageDesc { module: fragment_module, entry_point: "main".to_string() }),
            color_targets: &[ColorTargetState { format: TextureFormat::Rgba8Unorm, blend: None, write_mask: ColorWrites::ALL }],
            depth_stencil: None,
            primitive: PrimitiveState::default(),
            sample_count: 1,
        })
        .unwrap();

    let mut encoder = device.create_command_encoder(&queue, "frame").unwrap();
    encoder
        .begin_render_pass(
            Some("pass"),
            Extent3d { width: 4, height: 4, depth_or_array_layers: 1 },
            &[Some(wgx_core::command::ColorAttachmentDesc {
                target: color_view,
                resolve_target: None,
                load_op: LoadOp::Clear(ClearColor { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }),
                store_op: StoreOp::Store,
            })],
            None,
        )
        .unwrap();
    encoder.set_render_pipeline(pipeline).unwrap();
    encoder.set_vertex_buffer(0, vertex_buffer, 0).unwrap();
    encoder.draw(0, 3, 0, 1).unwrap();
    encoder.end_render_pass().unwrap();

    let command_buffer = encoder.finish().unwrap();
    let submission = queue.submit(&device, &[command_buffer]).unwrap();
    queue.wait(&device, submission, Duration::from_secs(1)).unwrap();
}

#[test]
fn draw_without_a_bound_pipeline_is_a_validation_error() {
    let (device, queue) = open_device();
    let mut encoder = device.create_command_encoder(&queue, "frame").unwrap();

    let color_id = device
        .create_texture(&TextureDescriptor {
            label: None,
            size: Extent3d { width: 2, height: 2, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUses::COLOR_TARGET,
        })
        .unwrap();
    let view = device
        .create_texture_view(
            color_id,
            &TextureViewDescriptor {
                label: None,
                format: TextureFormat::Rgba8Unorm,
                range: SubresourceRange { base_mip_level: 0, mip_level_count: 1, base_array_layer: 0, array_layer_count: 1 },
            },
        )
        .unwrap();

    encoder
        .begin_render_pass(
            None,
            Extent3d { width: 2, height: 2, depth_or_array_layers: 1 },
            &[Some(wgx_core::command::ColorAttachmentDesc {
                target: view,
                resolve_target: None,
                load_op: LoadOp::Load,
                store_op: StoreOp::Store,
            })],
            None,
        )
        .unwrap();

    let err = encoder.draw(0, 3, 0, 1).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn occlusion_query_set_round_trips_through_the_hub() {
    let (device, _queue) = open_device();
    let set = device
        .create_query_set(&QuerySetDescriptor { label: None, ty: QueryType::Occlusion, count: 8 })
        .unwrap();
    device.destroy_query_set(set).unwrap();
    // A destroyed set's id is stale; a second destroy must not succeed.
    assert!(device.destroy_query_set(set).is_err());
}

#[test]
fn bind_group_layout_round_trips() {
    let (device, _queue) = open_device();
    let layout = device
        .create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: None,
            entries: Cow::Borrowed(&[wgx_hal::pso::BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: wgx_hal::pso::BindingType::Sampler,
            }]),
        })
        .unwrap();
    device.create_pipeline_layout(None, &[layout]).unwrap();
}

fn bytemuck_cast(floats: &[f32]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(floats.as_ptr().cast::<u8>(), std::mem::size_of_val(floats)) }
}
